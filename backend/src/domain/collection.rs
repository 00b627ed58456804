//! Named machine groupings used purely for filtering.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum collection name length.
pub const COLLECTION_NAME_MAX: usize = 50;

/// Validation errors returned by [`CollectionName::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollectionNameError {
    /// Name was empty.
    #[error("collection name must not be empty")]
    Empty,
    /// Name exceeds [`COLLECTION_NAME_MAX`] characters.
    #[error("collection name must be at most {COLLECTION_NAME_MAX} characters")]
    TooLong,
    /// Name contains characters outside letters, numbers, and hyphens.
    #[error("collection names can only contain letters, numbers, and hyphens")]
    InvalidCharacters,
}

static COLLECTION_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn collection_name_regex() -> &'static Regex {
    COLLECTION_NAME_RE.get_or_init(|| {
        let pattern = "^[A-Za-z0-9-]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("collection name regex failed to compile: {error}"))
    })
}

/// Validated collection name.
///
/// ## Invariants
/// - Matches `^[A-Za-z0-9-]+$` and is at most [`COLLECTION_NAME_MAX`]
///   characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CollectionName(String);

impl CollectionName {
    /// Validate and construct a collection name.
    pub fn new(name: impl Into<String>) -> Result<Self, CollectionNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(CollectionNameError::Empty);
        }
        if name.chars().count() > COLLECTION_NAME_MAX {
            return Err(CollectionNameError::TooLong);
        }
        if !collection_name_regex().is_match(&name) {
            return Err(CollectionNameError::InvalidCharacters);
        }
        Ok(Self(name))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for CollectionName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<CollectionName> for String {
    fn from(value: CollectionName) -> Self {
        value.0
    }
}

impl TryFrom<String> for CollectionName {
    type Error = CollectionNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A named grouping of machines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Primary key.
    pub id: Uuid,
    /// Unique validated name.
    pub name: String,
}
