//! Fault cases and their append-only notes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle state of a fault case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FaultStatus {
    /// Reported and awaiting work.
    Open,
    /// Repair work has started.
    InProgress,
    /// Terminal state reached via the explicit resolve action.
    Resolved,
}

/// Error returned when a stored fault status label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fault status label: {label}")]
pub struct FaultStatusParseError {
    /// The label that failed to parse.
    pub label: String,
}

impl FaultStatus {
    /// Canonical label persisted in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }

    /// Whether work on this case is still outstanding.
    pub const fn is_outstanding(self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

impl FromStr for FaultStatus {
    type Err = FaultStatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "resolved" => Ok(Self::Resolved),
            other => Err(FaultStatusParseError {
                label: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for FaultStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reported failure record tied to a machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaultCase {
    /// Primary key.
    pub id: Uuid,
    /// Owning machine.
    pub machine_id: Uuid,
    /// Reporter; `None` after the reporting user was deleted.
    pub reported_by: Option<Uuid>,
    /// Lifecycle state.
    pub status: FaultStatus,
    /// Optional short title describing the fault.
    pub title: Option<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Append-only comment or attachment on a fault case.
///
/// Notes carry no update path: once written they form the incident log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaultNote {
    /// Primary key.
    pub id: Uuid,
    /// Owning fault case.
    pub fault_case_id: Uuid,
    /// Note text; may be empty when only an image was attached.
    pub note: String,
    /// Optional path to an attached image.
    pub image_path: Option<String>,
    /// Author; `None` after the authoring user was deleted.
    pub created_by: Option<Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Content of a new fault note. At least one of text or image is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteContent {
    /// Note text.
    pub note: String,
    /// Optional attached image path.
    pub image_path: Option<String>,
}

impl NoteContent {
    /// Build note content, returning `None` when both parts are absent.
    ///
    /// Mirrors the form handling of the original system: an empty note with
    /// no image is silently dropped rather than rejected.
    pub fn from_parts(note: Option<String>, image_path: Option<String>) -> Option<Self> {
        let note = note.unwrap_or_default();
        if note.trim().is_empty() && image_path.is_none() {
            return None;
        }
        Some(Self { note, image_path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FaultStatus::Open, "open", true)]
    #[case(FaultStatus::InProgress, "in_progress", true)]
    #[case(FaultStatus::Resolved, "resolved", false)]
    fn status_labels_and_outstanding(
        #[case] status: FaultStatus,
        #[case] label: &str,
        #[case] outstanding: bool,
    ) {
        assert_eq!(status.as_str(), label);
        assert_eq!(label.parse::<FaultStatus>().expect("parses"), status);
        assert_eq!(status.is_outstanding(), outstanding);
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some("".to_owned()), None)]
    #[case(Some("   ".to_owned()), None)]
    fn empty_note_without_image_is_dropped(
        #[case] note: Option<String>,
        #[case] image: Option<String>,
    ) {
        assert!(NoteContent::from_parts(note, image).is_none());
    }

    #[rstest]
    fn image_alone_is_enough() {
        let content = NoteContent::from_parts(None, Some("fault_notes/leak.jpg".to_owned()))
            .expect("image-only note accepted");
        assert_eq!(content.note, "");
        assert_eq!(content.image_path.as_deref(), Some("fault_notes/leak.jpg"));
    }
}
