//! Diesel row structs bridging the database schema and domain types.
//!
//! Rows are internal to the persistence layer. Conversion into domain
//! types happens here so repositories stay focused on queries; label
//! columns (`status`, `role`) are parsed on the way out and surface
//! drifted values as query errors or, where the domain type tolerates
//! it, as `None` with a warning.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::warn;
use uuid::Uuid;

use crate::domain::auth::UserAccount;
use crate::domain::collection::Collection;
use crate::domain::fault::{FaultCase, FaultNote, FaultStatus};
use crate::domain::machine::{Machine, MachineStatus};
use crate::domain::ports::{PersistenceError, StoredCredentials};
use crate::domain::role::Role;
use crate::domain::warning::Warning;

use super::schema::{
    collection_machines, collections, fault_cases, fault_notes, machine_assignments, machines,
    user_profiles, users, warnings,
};

/// Database row for the `users` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub(crate) id: Uuid,
    pub(crate) username: String,
    pub(crate) password_hash: String,
    pub(crate) is_superuser: bool,
    pub(crate) created_at: DateTime<Utc>,
}

/// Insertable row for new accounts. `created_at` defaults in the database.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) username: &'a str,
    pub(crate) password_hash: &'a str,
    pub(crate) is_superuser: bool,
}

/// Insertable row for the account's profile.
#[derive(Debug, Insertable)]
#[diesel(table_name = user_profiles)]
pub(crate) struct NewUserProfileRow<'a> {
    pub(crate) user_id: Uuid,
    pub(crate) role: &'a str,
}

/// Database row for the `machines` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = machines)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MachineRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) status: String,
    pub(crate) image_path: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Insertable row for new machines. Timestamps default in the database.
#[derive(Debug, Insertable)]
#[diesel(table_name = machines)]
pub(crate) struct NewMachineRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) name: &'a str,
    pub(crate) description: &'a str,
    pub(crate) status: &'a str,
    pub(crate) image_path: Option<&'a str>,
}

/// Insertable row linking a user to a machine.
#[derive(Debug, Insertable)]
#[diesel(table_name = machine_assignments)]
pub(crate) struct NewMachineAssignmentRow {
    pub(crate) id: Uuid,
    pub(crate) machine_id: Uuid,
    pub(crate) user_id: Uuid,
}

/// Database row for the `fault_cases` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = fault_cases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FaultCaseRow {
    pub(crate) id: Uuid,
    pub(crate) machine_id: Uuid,
    pub(crate) reported_by: Option<Uuid>,
    pub(crate) status: String,
    pub(crate) title: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

/// Insertable row for new fault cases.
#[derive(Debug, Insertable)]
#[diesel(table_name = fault_cases)]
pub(crate) struct NewFaultCaseRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) machine_id: Uuid,
    pub(crate) reported_by: Option<Uuid>,
    pub(crate) status: &'a str,
    pub(crate) title: Option<&'a str>,
}

/// Database row for the `fault_notes` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = fault_notes)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FaultNoteRow {
    pub(crate) id: Uuid,
    pub(crate) fault_case_id: Uuid,
    pub(crate) note: String,
    pub(crate) image_path: Option<String>,
    pub(crate) created_by: Option<Uuid>,
    pub(crate) created_at: DateTime<Utc>,
}

/// Insertable row for new fault notes.
#[derive(Debug, Insertable)]
#[diesel(table_name = fault_notes)]
pub(crate) struct NewFaultNoteRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) fault_case_id: Uuid,
    pub(crate) note: &'a str,
    pub(crate) image_path: Option<&'a str>,
    pub(crate) created_by: Option<Uuid>,
}

/// Database row for the `warnings` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = warnings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct WarningRow {
    pub(crate) id: Uuid,
    pub(crate) machine_id: Uuid,
    pub(crate) warning_text: String,
    pub(crate) created_by: Option<Uuid>,
    pub(crate) active: bool,
    pub(crate) created_at: DateTime<Utc>,
}

/// Insertable row for new warnings.
#[derive(Debug, Insertable)]
#[diesel(table_name = warnings)]
pub(crate) struct NewWarningRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) machine_id: Uuid,
    pub(crate) warning_text: &'a str,
    pub(crate) created_by: Option<Uuid>,
    pub(crate) active: bool,
}

/// Database row for the `collections` table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = collections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CollectionRow {
    pub(crate) id: Uuid,
    pub(crate) name: String,
}

/// Insertable row for new collections.
#[derive(Debug, Insertable)]
#[diesel(table_name = collections)]
pub(crate) struct NewCollectionRow<'a> {
    pub(crate) id: Uuid,
    pub(crate) name: &'a str,
}

/// Insertable row linking a machine into a collection.
#[derive(Debug, Insertable)]
#[diesel(table_name = collection_machines)]
pub(crate) struct NewCollectionMachineRow {
    pub(crate) id: Uuid,
    pub(crate) collection_id: Uuid,
    pub(crate) machine_id: Uuid,
}

/// Convert a machine row, rejecting unrecognised status labels.
pub(crate) fn row_to_machine(row: MachineRow) -> Result<Machine, PersistenceError> {
    let status: MachineStatus = row.status.parse().map_err(|_| {
        warn!(machine_id = %row.id, label = %row.status, "unrecognised machine status label");
        PersistenceError::query("unrecognised machine status label")
    })?;
    Ok(Machine {
        id: row.id,
        name: row.name,
        description: row.description,
        status,
        image_path: row.image_path,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Convert a fault case row, rejecting unrecognised status labels.
pub(crate) fn row_to_fault_case(row: FaultCaseRow) -> Result<FaultCase, PersistenceError> {
    let status: FaultStatus = row.status.parse().map_err(|_| {
        warn!(fault_id = %row.id, label = %row.status, "unrecognised fault status label");
        PersistenceError::query("unrecognised fault status label")
    })?;
    Ok(FaultCase {
        id: row.id,
        machine_id: row.machine_id,
        reported_by: row.reported_by,
        status,
        title: row.title,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub(crate) fn row_to_fault_note(row: FaultNoteRow) -> FaultNote {
    FaultNote {
        id: row.id,
        fault_case_id: row.fault_case_id,
        note: row.note,
        image_path: row.image_path,
        created_by: row.created_by,
        created_at: row.created_at,
    }
}

pub(crate) fn row_to_warning(row: WarningRow) -> Warning {
    Warning {
        id: row.id,
        machine_id: row.machine_id,
        warning_text: row.warning_text,
        created_by: row.created_by,
        active: row.active,
        created_at: row.created_at,
    }
}

pub(crate) fn row_to_collection(row: CollectionRow) -> Collection {
    Collection {
        id: row.id,
        name: row.name,
    }
}

/// Parse a profile role label, yielding `None` with a warning when the
/// stored label is unrecognised. The account stays usable as view-only.
pub(crate) fn parse_role(user_id: Uuid, label: Option<String>) -> Option<Role> {
    let label = label?;
    match label.parse::<Role>() {
        Ok(role) => Some(role),
        Err(_) => {
            warn!(%user_id, %label, "unrecognised role label, treating account as roleless");
            None
        }
    }
}

/// Join a user row with its optional profile role into a domain account.
pub(crate) fn rows_to_account(user: UserRow, role_label: Option<String>) -> UserAccount {
    let role = parse_role(user.id, role_label);
    UserAccount {
        id: user.id,
        username: user.username,
        role,
        is_superuser: user.is_superuser,
        created_at: user.created_at,
    }
}

pub(crate) fn row_to_credentials(row: UserRow) -> StoredCredentials {
    StoredCredentials {
        user_id: row.id,
        password_hash: row.password_hash,
    }
}
