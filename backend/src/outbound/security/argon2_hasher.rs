//! Argon2id implementation of the password hashing port.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordVerifier};

use crate::domain::ports::{PasswordHashError, PasswordHasher};

/// Argon2id hasher producing and verifying PHC-format strings.
///
/// Uses the `argon2` crate's default parameters, which track the OWASP
/// recommendations for interactive logins.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    /// Create a hasher with default Argon2id parameters.
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2::PasswordHasher::hash_password(&argon2, password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|err| PasswordHashError::crypto(format!("hash error: {err}")))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError> {
        let parsed_hash = argon2::PasswordHash::new(hash)
            .map_err(|err| PasswordHashError::crypto(format!("invalid hash format: {err}")))?;

        let argon2 = Argon2::default();
        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(err) => Err(PasswordHashError::crypto(format!("verify error: {err}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn correct_password_matches() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("hunter2").expect("hashing succeeds");
        assert!(hasher.verify("hunter2", &hash).expect("well-formed hash"));
    }

    #[rstest]
    fn wrong_password_does_not_match() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash("hunter2").expect("hashing succeeds");
        assert!(!hasher.verify("wrong", &hash).expect("well-formed hash"));
    }

    #[rstest]
    fn hashes_are_salted() {
        let hasher = Argon2PasswordHasher::new();
        let first = hasher.hash("hunter2").expect("hashing succeeds");
        let second = hasher.hash("hunter2").expect("hashing succeeds");
        assert_ne!(first, second);
    }

    #[rstest]
    fn malformed_hash_is_a_crypto_error() {
        let hasher = Argon2PasswordHasher::new();
        let err = hasher
            .verify("pw", "not-a-hash")
            .expect_err("malformed hash must error");
        assert!(matches!(err, PasswordHashError::Crypto { .. }));
    }
}
