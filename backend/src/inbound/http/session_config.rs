//! Session configuration parsing and validation.
//!
//! Centralises the environment-driven session settings so they are
//! validated consistently and can be tested in isolation. Release builds
//! require explicit, valid toggles; debug builds tolerate defaults and log
//! warnings instead.

use actix_web::cookie::{Key, SameSite};
use std::path::PathBuf;
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Raw environment values consumed by [`session_settings`].
#[derive(Clone, Debug, Default)]
pub struct SessionEnv {
    /// `SESSION_COOKIE_SECURE` value, if set.
    pub cookie_secure: Option<String>,
    /// `SESSION_SAMESITE` value, if set.
    pub same_site: Option<String>,
    /// `SESSION_ALLOW_EPHEMERAL` value, if set.
    pub allow_ephemeral: Option<String>,
    /// `SESSION_KEY_FILE` value, if set.
    pub key_file: Option<String>,
}

impl SessionEnv {
    /// Capture the session variables from the process environment.
    pub fn from_process() -> Self {
        Self {
            cookie_secure: std::env::var(COOKIE_SECURE_ENV).ok(),
            same_site: std::env::var(SAMESITE_ENV).ok(),
            allow_ephemeral: std::env::var(ALLOW_EPHEMERAL_ENV).ok(),
            key_file: std::env::var(KEY_FILE_ENV).ok(),
        }
    }
}

/// Session settings derived from configuration toggles.
pub struct SessionSettings {
    /// Signing key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Configured `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("key", &"<redacted>")
            .field("cookie_secure", &self.cookie_secure)
            .field("same_site", &self.same_site)
            .finish()
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file exists but is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` requires a secure cookie setting in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral session keys.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from captured environment values and build mode.
pub fn session_settings(
    env: &SessionEnv,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = cookie_secure_from(env, mode)?;
    let same_site = same_site_from(env, mode, cookie_secure)?;
    let allow_ephemeral = allow_ephemeral_from(env, mode)?;
    let key = session_key_from(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn cookie_secure_from(env: &SessionEnv, mode: BuildMode) -> Result<bool, SessionConfigError> {
    match env.cookie_secure.as_deref() {
        Some(value) => match parse_bool(value) {
            Some(flag) => Ok(flag),
            None => {
                if mode.is_debug() {
                    warn!(value, "invalid SESSION_COOKIE_SECURE; defaulting to secure");
                    Ok(true)
                } else {
                    Err(SessionConfigError::InvalidEnv {
                        name: COOKIE_SECURE_ENV,
                        value: value.to_owned(),
                        expected: BOOL_EXPECTED,
                    })
                }
            }
        },
        None => {
            if mode.is_debug() {
                warn!("SESSION_COOKIE_SECURE not set; defaulting to secure");
                Ok(true)
            } else {
                Err(SessionConfigError::MissingEnv {
                    name: COOKIE_SECURE_ENV,
                })
            }
        }
    }
}

fn same_site_from(
    env: &SessionEnv,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };

    let value = match env.same_site.as_deref() {
        Some(value) => value,
        None => {
            if mode.is_debug() {
                warn!("SESSION_SAMESITE not set; using default");
                return Ok(default_same_site);
            }
            return Err(SessionConfigError::MissingEnv { name: SAMESITE_ENV });
        }
    };

    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => {
            if !cookie_secure {
                if mode.is_debug() {
                    warn!(
                        "{}",
                        concat!(
                            "SESSION_SAMESITE=None with SESSION_COOKIE_SECURE=0; ",
                            "browsers may reject third-party cookies"
                        )
                    );
                } else {
                    return Err(SessionConfigError::InsecureSameSiteNone);
                }
            }
            Ok(SameSite::None)
        }
        _ => {
            if mode.is_debug() {
                warn!(value, "invalid SESSION_SAMESITE, using default");
                Ok(default_same_site)
            } else {
                Err(SessionConfigError::InvalidEnv {
                    name: SAMESITE_ENV,
                    value: value.to_owned(),
                    expected: SAMESITE_EXPECTED,
                })
            }
        }
    }
}

fn allow_ephemeral_from(env: &SessionEnv, mode: BuildMode) -> Result<bool, SessionConfigError> {
    match env.allow_ephemeral.as_deref() {
        Some(value) => match parse_bool(value) {
            Some(true) => {
                if mode.is_debug() {
                    Ok(true)
                } else {
                    Err(SessionConfigError::EphemeralNotAllowed)
                }
            }
            Some(false) => Ok(false),
            None => {
                if mode.is_debug() {
                    warn!(value, "invalid SESSION_ALLOW_EPHEMERAL; defaulting to disabled");
                    Ok(false)
                } else {
                    Err(SessionConfigError::InvalidEnv {
                        name: ALLOW_EPHEMERAL_ENV,
                        value: value.to_owned(),
                        expected: BOOL_EXPECTED,
                    })
                }
            }
        },
        None => {
            if mode.is_debug() {
                warn!("SESSION_ALLOW_EPHEMERAL not set; defaulting to disabled");
                Ok(false)
            } else {
                Err(SessionConfigError::MissingEnv {
                    name: ALLOW_EPHEMERAL_ENV,
                })
            }
        }
    }
}

fn session_key_from(
    env: &SessionEnv,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let key_path = env
        .key_file
        .clone()
        .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned());
    let path = PathBuf::from(key_path);

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) => {
            if mode.is_debug() || allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary session key (dev only)"
                );
                Ok(Key::generate())
            } else {
                Err(SessionConfigError::KeyRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn release_env(key_path: &std::path::Path) -> SessionEnv {
        SessionEnv {
            cookie_secure: Some("1".to_owned()),
            same_site: Some("Strict".to_owned()),
            allow_ephemeral: Some("0".to_owned()),
            key_file: Some(key_path.to_string_lossy().into_owned()),
        }
    }

    fn write_key(len: usize) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("session_key_{}", uuid::Uuid::new_v4()));
        std::fs::write(&path, vec![b'a'; len]).expect("write key fixture");
        path
    }

    #[rstest]
    #[case("1", Some(true))]
    #[case("true", Some(true))]
    #[case("Y", Some(true))]
    #[case("0", Some(false))]
    #[case("no", Some(false))]
    #[case("maybe", None)]
    fn bool_parsing(#[case] value: &str, #[case] expected: Option<bool>) {
        assert_eq!(parse_bool(value), expected);
    }

    #[rstest]
    fn release_accepts_explicit_configuration() {
        let key_path = write_key(64);
        let settings = session_settings(&release_env(&key_path), BuildMode::Release)
            .expect("valid release configuration");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
        std::fs::remove_file(&key_path).expect("cleanup");
    }

    #[rstest]
    fn release_rejects_short_keys() {
        let key_path = write_key(16);
        let err = session_settings(&release_env(&key_path), BuildMode::Release)
            .expect_err("short key must fail");
        assert!(matches!(err, SessionConfigError::KeyTooShort { .. }));
        std::fs::remove_file(&key_path).expect("cleanup");
    }

    #[rstest]
    fn release_rejects_missing_toggles() {
        let err = session_settings(&SessionEnv::default(), BuildMode::Release)
            .expect_err("missing toggles must fail");
        assert!(matches!(err, SessionConfigError::MissingEnv { .. }));
    }

    #[rstest]
    fn release_rejects_insecure_samesite_none() {
        let key_path = write_key(64);
        let env = SessionEnv {
            cookie_secure: Some("0".to_owned()),
            same_site: Some("None".to_owned()),
            ..release_env(&key_path)
        };
        let err = session_settings(&env, BuildMode::Release).expect_err("must fail");
        assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
        std::fs::remove_file(&key_path).expect("cleanup");
    }

    #[rstest]
    fn debug_tolerates_an_empty_environment() {
        let settings = session_settings(&SessionEnv::default(), BuildMode::Debug)
            .expect("debug defaults apply");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Lax);
    }
}
