//! Authentication and account-management primitives.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use zeroize::Zeroizing;

use super::role::Role;

/// Maximum username length, matching the persistence column.
pub const USERNAME_MAX: usize = 150;

/// Validation errors for usernames.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsernameValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    Empty,
    /// Username exceeds [`USERNAME_MAX`] characters.
    #[error("username must be at most {USERNAME_MAX} characters")]
    TooLong,
}

/// Trimmed, bounded username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a username, trimming surrounding whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, UsernameValidationError> {
        let trimmed = value.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(UsernameValidationError::Empty);
        }
        if trimmed.chars().count() > USERNAME_MAX {
            return Err(UsernameValidationError::TooLong);
        }
        Ok(Self(trimmed))
    }

    /// Borrow the username.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by the directory service.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace to avoid surprising credential comparisons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for user lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// A registered account joined with its profile role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Primary key.
    pub id: Uuid,
    /// Unique username.
    pub username: String,
    /// Profile role; `None` when the stored label was unrecognised.
    pub role: Option<Role>,
    /// Superuser flag supplied by the authentication provider.
    pub is_superuser: bool,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Field-level validation failures for manager-driven registration.
///
/// Each variant names the form field at fault so the inbound adapter can
/// report it back without partial writes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationValidationError {
    /// Username missing, blank, or overlong.
    #[error(transparent)]
    Username(#[from] UsernameValidationError),
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,
    /// Role label is not one of the four known roles.
    #[error("role must be one of Manager, Technician, Repair, View-only")]
    UnknownRole,
}

/// Validated registration form for a manager-created account.
#[derive(Debug, Clone)]
pub struct Registration {
    username: Username,
    password: Zeroizing<String>,
    role: Role,
}

impl Registration {
    /// Validate the registration form fields.
    ///
    /// Uniqueness of the username is enforced later against the store; this
    /// constructor covers the purely local checks.
    pub fn try_from_parts(
        username: &str,
        password: &str,
        confirm_password: &str,
        role: &str,
    ) -> Result<Self, RegistrationValidationError> {
        let username = Username::new(username)?;
        if password.is_empty() {
            return Err(RegistrationValidationError::EmptyPassword);
        }
        if password != confirm_password {
            return Err(RegistrationValidationError::PasswordMismatch);
        }
        let role = Role::from_str(role).map_err(|_| RegistrationValidationError::UnknownRole)?;
        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
            role,
        })
    }

    /// Username for the new account.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Plaintext password awaiting hashing.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Role for the new account's profile.
    pub fn role(&self) -> Role {
        self.role
    }
}
