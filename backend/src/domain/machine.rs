//! Machine entity and operational status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Operational status of a machine.
///
/// Status is never mutated directly by handlers; every transition flows
/// through [`crate::domain::rules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum MachineStatus {
    /// Machine is operating normally.
    Ok,
    /// An active advisory warning is present.
    Warning,
    /// An open fault case is present.
    Fault,
}

/// Error returned when a stored status label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown machine status label: {label}")]
pub struct MachineStatusParseError {
    /// The label that failed to parse.
    pub label: String,
}

impl MachineStatus {
    /// Canonical label persisted in the database and exported to CSV.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "Warning",
            Self::Fault => "Fault",
        }
    }
}

impl FromStr for MachineStatus {
    type Err = MachineStatusParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "OK" => Ok(Self::Ok),
            "Warning" => Ok(Self::Warning),
            "Fault" => Ok(Self::Fault),
            other => Err(MachineStatusParseError {
                label: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked piece of factory equipment.
///
/// ## Invariants
/// - `status` stays consistent with the machine's open fault cases and
///   active warnings; only [`crate::domain::rules`] transitions mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    /// Primary key.
    pub id: Uuid,
    /// Human-readable machine name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Current operational status.
    pub status: MachineStatus,
    /// Optional path to an uploaded machine image.
    pub image_path: Option<String>,
    /// Record creation timestamp; tie-breaker for priority ordering.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMachine {
    /// Machine name supplied by the manager.
    pub name: String,
    /// Description; the creation form supplies a default.
    pub description: String,
    /// Optional path to an uploaded image.
    pub image_path: Option<String>,
}
