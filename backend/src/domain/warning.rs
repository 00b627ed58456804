//! Machine warnings: free-text advisory flags distinct from fault cases.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum warning text length accepted from the form.
pub const WARNING_TEXT_MAX: usize = 255;

/// Validation errors returned by [`WarningText::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WarningValidationError {
    /// Text was empty once trimmed.
    #[error("warning text must not be empty")]
    EmptyText,
    /// Text exceeds [`WARNING_TEXT_MAX`] characters.
    #[error("warning text must be at most {WARNING_TEXT_MAX} characters")]
    TextTooLong,
}

/// Trimmed, bounded warning text.
///
/// ## Invariants
/// - Non-empty after trimming; at most [`WARNING_TEXT_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WarningText(String);

impl WarningText {
    /// Validate and construct warning text, trimming surrounding whitespace.
    pub fn new(text: impl Into<String>) -> Result<Self, WarningValidationError> {
        let trimmed = text.into().trim().to_owned();
        if trimmed.is_empty() {
            return Err(WarningValidationError::EmptyText);
        }
        if trimmed.chars().count() > WARNING_TEXT_MAX {
            return Err(WarningValidationError::TextTooLong);
        }
        Ok(Self(trimmed))
    }

    /// Borrow the text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for WarningText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for WarningText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<WarningText> for String {
    fn from(value: WarningText) -> Self {
        value.0
    }
}

impl TryFrom<String> for WarningText {
    type Error = WarningValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// An advisory flag on a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Warning {
    /// Primary key.
    pub id: Uuid,
    /// Owning machine.
    pub machine_id: Uuid,
    /// Advisory text.
    pub warning_text: String,
    /// Author; `None` after the authoring user was deleted.
    pub created_by: Option<Uuid>,
    /// Whether the warning is still in force.
    pub active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", WarningValidationError::EmptyText)]
    #[case("   ", WarningValidationError::EmptyText)]
    fn rejects_blank_text(#[case] text: &str, #[case] expected: WarningValidationError) {
        assert_eq!(WarningText::new(text).expect_err("must fail"), expected);
    }

    #[rstest]
    fn rejects_overlong_text() {
        let text = "x".repeat(WARNING_TEXT_MAX + 1);
        assert_eq!(
            WarningText::new(text).expect_err("must fail"),
            WarningValidationError::TextTooLong
        );
    }

    #[rstest]
    fn trims_surrounding_whitespace() {
        let text = WarningText::new("  oil low  ").expect("valid");
        assert_eq!(text.as_str(), "oil low");
    }
}
