//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the domain expects to interact with adapters
//! (database repositories, password hashing). Driving ports are the
//! use-case surface consumed by the HTTP adapter. Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants instead of returning `anyhow::Result`.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::auth::{LoginCredentials, Registration, UserAccount, Username};
use super::collection::{Collection, CollectionName};
use super::fault::{FaultCase, FaultNote, NoteContent};
use super::machine::{Machine, NewMachine};
use super::role::{Actor, Role};
use super::views::{ManagerOverview, ReportFilter, ReportRow, RepairBoard, StatusBoard, TechnicianBoard};
use super::warning::{Warning, WarningText};
use super::Error;

/// Errors surfaced by persistence adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistenceError {
    /// Database connectivity or pool checkout failures.
    #[error("persistence connection failed: {message}")]
    Connection {
        /// Adapter-provided diagnostic.
        message: String,
    },
    /// Query construction or execution failures.
    #[error("persistence query failed: {message}")]
    Query {
        /// Adapter-provided diagnostic.
        message: String,
    },
    /// Unique constraint violations.
    #[error("persistence conflict: {message}")]
    Conflict {
        /// Adapter-provided diagnostic.
        message: String,
    },
}

impl PersistenceError {
    /// Helper for connection related adapter errors.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Helper for unique constraint conflicts.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Map a persistence failure into the transport-agnostic domain error.
pub fn map_persistence_error(error: PersistenceError) -> Error {
    match error {
        PersistenceError::Connection { message } => {
            Error::service_unavailable(format!("store unavailable: {message}"))
        }
        PersistenceError::Query { message } => Error::internal(format!("store error: {message}")),
        PersistenceError::Conflict { message } => Error::conflict(message),
    }
}

/// Outcome of a mutating action that degrades to a no-op on missing ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The write took effect.
    Applied,
    /// A referenced record was missing; nothing was written. The caller
    /// still redirects as if the action succeeded.
    NoOp,
}

/// Result of an exclusive assignment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// The machine id did not resolve; nothing changed.
    MachineNotFound,
    /// Prior holders of the role slot were cleared but the target was
    /// missing or holds a different role, so no new assignment was made.
    ClearedOnly,
    /// Prior holders were cleared and the target user was assigned.
    Assigned,
}

/// Result of an active-warning creation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningCreation {
    /// A new warning row was inserted and the machine moved to `Warning`.
    Created,
    /// A case-insensitive duplicate was already active; no row was
    /// inserted but the machine still moved to `Warning`.
    DuplicateSuppressed,
}

/// Machine persistence port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MachineRepository: Send + Sync {
    /// Insert a machine with status `OK`.
    async fn create(&self, machine: NewMachine) -> Result<Machine, PersistenceError>;

    /// Fetch a machine by id.
    async fn find(&self, id: Uuid) -> Result<Option<Machine>, PersistenceError>;

    /// All machines, in storage order. Callers apply the priority sort.
    async fn list_all(&self) -> Result<Vec<Machine>, PersistenceError>;

    /// Machines belonging to a collection, each appearing exactly once.
    async fn list_in_collection(&self, collection_id: Uuid)
        -> Result<Vec<Machine>, PersistenceError>;

    /// Machines a user is assigned to.
    async fn list_assigned_to(&self, user_id: Uuid) -> Result<Vec<Machine>, PersistenceError>;

    /// Delete a machine, cascading to its fault cases and warnings.
    /// Returns `false` when the id did not resolve.
    async fn delete(&self, id: Uuid) -> Result<bool, PersistenceError>;
}

/// Fault case persistence port.
///
/// Compound operations run inside one transaction and apply the
/// [`crate::domain::rules`] status transitions so the read-check-write
/// sequences stay atomic per machine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FaultCaseRepository: Send + Sync {
    /// Insert an open fault case and force the owning machine to `Fault`
    /// per [`crate::domain::rules::status_after_fault_reported`].
    /// Returns `None` when the machine id did not resolve.
    async fn create_open(
        &self,
        machine_id: Uuid,
        reported_by: Uuid,
        title: Option<String>,
    ) -> Result<Option<FaultCase>, PersistenceError>;

    /// Move an open fault case to `in_progress`. Machine status is
    /// untouched. Returns `false` when the case is missing or not open.
    async fn start_progress(&self, fault_id: Uuid) -> Result<bool, PersistenceError>;

    /// Mark a fault case resolved and reset the owning machine to `OK`
    /// per [`crate::domain::rules::status_after_fault_resolved`].
    /// Returns `false` when the fault id did not resolve.
    async fn resolve(&self, fault_id: Uuid) -> Result<bool, PersistenceError>;

    /// Append a note to a fault case. Returns `None` when the fault id
    /// did not resolve.
    async fn add_note(
        &self,
        fault_id: Uuid,
        content: NoteContent,
        created_by: Uuid,
    ) -> Result<Option<FaultNote>, PersistenceError>;

    /// All outstanding (open or in-progress) fault cases, newest first.
    async fn list_outstanding(&self) -> Result<Vec<FaultCase>, PersistenceError>;

    /// The most recently created fault cases, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<FaultCase>, PersistenceError>;

    /// Outstanding fault cases the user reported or that sit on machines
    /// the user is assigned to.
    async fn list_outstanding_for_actor(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<FaultCase>, PersistenceError>;

    /// Notes on a fault case, oldest first.
    async fn list_notes(&self, fault_id: Uuid) -> Result<Vec<FaultNote>, PersistenceError>;
}

/// Warning persistence port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WarningRepository: Send + Sync {
    /// Create an active warning unless a case-insensitive duplicate is
    /// already active, then force the machine to `Warning` either way, per
    /// [`crate::domain::rules`]. Returns `None` when the machine id did
    /// not resolve. Duplicate check, insert, and status write share one
    /// transaction.
    async fn create_active(
        &self,
        machine_id: Uuid,
        text: WarningText,
        created_by: Uuid,
    ) -> Result<Option<WarningCreation>, PersistenceError>;

    /// Delete a warning; when no active warning remains on the machine,
    /// reset its status to `OK` per
    /// [`crate::domain::rules::status_after_warning_deleted`]. Returns
    /// `false` when the warning id did not resolve.
    async fn delete(&self, warning_id: Uuid) -> Result<bool, PersistenceError>;

    /// All active warnings, newest first.
    async fn list_active(&self) -> Result<Vec<Warning>, PersistenceError>;
}

/// Collection persistence port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CollectionRepository: Send + Sync {
    /// All collections, ordered by name.
    async fn list(&self) -> Result<Vec<Collection>, PersistenceError>;

    /// Fetch a collection by id.
    async fn find(&self, id: Uuid) -> Result<Option<Collection>, PersistenceError>;

    /// Fetch an existing collection by name or create it.
    async fn get_or_create(&self, name: &CollectionName) -> Result<Collection, PersistenceError>;

    /// Link a machine into a collection. Idempotent; returns `false` when
    /// either id did not resolve.
    async fn add_machine(
        &self,
        collection_id: Uuid,
        machine_id: Uuid,
    ) -> Result<bool, PersistenceError>;

    /// Names of the collections containing a machine, ordered by name so
    /// exports are deterministic per run.
    async fn names_for_machine(&self, machine_id: Uuid) -> Result<Vec<String>, PersistenceError>;
}

/// Assignment persistence port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentRepository: Send + Sync {
    /// Exclusive role-slot assignment: remove every assigned user holding
    /// `role`, then add the target only when it exists and holds exactly
    /// that role. The clear happens even when the add does not; the whole
    /// sequence shares one transaction.
    async fn assign_exclusive(
        &self,
        machine_id: Uuid,
        target_user_id: Uuid,
        role: Role,
    ) -> Result<AssignmentOutcome, PersistenceError>;

    /// Users assigned to a machine, ordered by username.
    async fn assigned_users(&self, machine_id: Uuid) -> Result<Vec<UserAccount>, PersistenceError>;
}

/// Stored credential material for password verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    /// Account id.
    pub user_id: Uuid,
    /// Argon2id PHC-format hash.
    pub password_hash: String,
}

/// User account persistence port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch an account (joined with its profile role) by id.
    async fn find(&self, id: Uuid) -> Result<Option<UserAccount>, PersistenceError>;

    /// Fetch stored credentials by username.
    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<StoredCredentials>, PersistenceError>;

    /// Whether a username is already registered.
    async fn username_taken(&self, username: &str) -> Result<bool, PersistenceError>;

    /// Create an account and its profile in one transaction.
    async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        role: Role,
    ) -> Result<UserAccount, PersistenceError>;

    /// Delete an account. Returns `false` when the id did not resolve.
    async fn delete(&self, id: Uuid) -> Result<bool, PersistenceError>;

    /// Accounts holding a role, ordered by username.
    async fn list_by_role(&self, role: Role) -> Result<Vec<UserAccount>, PersistenceError>;

    /// Non-superuser accounts other than the requester, ordered by
    /// username. Backs the manager's user-administration panel.
    async fn list_deletable(&self, requester: Uuid) -> Result<Vec<UserAccount>, PersistenceError>;
}

/// Errors surfaced by the password hashing adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordHashError {
    /// Hashing or verification machinery failed (malformed hash, RNG).
    #[error("password hashing failed: {message}")]
    Crypto {
        /// Adapter-provided diagnostic.
        message: String,
    },
}

impl PasswordHashError {
    /// Helper for crypto failures.
    pub fn crypto(message: impl Into<String>) -> Self {
        Self::Crypto {
            message: message.into(),
        }
    }
}

/// Password hashing port.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password into PHC format.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Verify a plaintext password against a stored hash.
    /// `Ok(false)` means a well-formed hash that does not match.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}

/// Fault workflow driving port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FaultWorkflow: Send + Sync {
    /// Report a fault against a machine; forces the machine to `Fault`.
    async fn report_fault(
        &self,
        actor_id: Uuid,
        machine_id: Uuid,
        title: Option<String>,
    ) -> Result<MutationOutcome, Error>;

    /// Append a note to a fault case. Empty content is a silent no-op.
    async fn add_fault_note(
        &self,
        actor_id: Uuid,
        fault_id: Uuid,
        note: Option<String>,
        image_path: Option<String>,
    ) -> Result<MutationOutcome, Error>;

    /// Move an open fault case to `in_progress`.
    async fn start_fault_progress(&self, fault_id: Uuid) -> Result<MutationOutcome, Error>;

    /// Resolve a fault case; resets the machine to `OK`.
    async fn resolve_fault(&self, fault_id: Uuid) -> Result<MutationOutcome, Error>;
}

/// Warning workflow driving port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WarningWorkflow: Send + Sync {
    /// Raise an active warning with duplicate suppression; moves the
    /// machine to `Warning` whether or not a row was created.
    async fn create_warning(
        &self,
        actor_id: Uuid,
        machine_id: Uuid,
        text: String,
    ) -> Result<MutationOutcome, Error>;

    /// Delete a warning; resets the machine to `OK` when it was the last
    /// active one.
    async fn delete_warning(&self, warning_id: Uuid) -> Result<MutationOutcome, Error>;
}

/// Assignment driving port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssignmentCommand: Send + Sync {
    /// Re-assign the machine's technician slot.
    async fn assign_technician(
        &self,
        machine_id: Uuid,
        technician_id: Uuid,
    ) -> Result<MutationOutcome, Error>;

    /// Re-assign the machine's repair slot.
    async fn assign_repair(
        &self,
        machine_id: Uuid,
        repair_id: Uuid,
    ) -> Result<MutationOutcome, Error>;
}

/// Machine administration driving port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MachineAdmin: Send + Sync {
    /// Create a machine and attach it to existing and newly named
    /// collections. Unknown collection ids and invalid new names are
    /// skipped silently.
    async fn add_machine(
        &self,
        actor: &Actor,
        machine: NewMachine,
        collection_ids: Vec<Uuid>,
        new_collections: Vec<String>,
    ) -> Result<MutationOutcome, Error>;

    /// Delete a machine, cascading to its fault cases and warnings.
    async fn delete_machine(&self, actor: &Actor, machine_id: Uuid)
        -> Result<MutationOutcome, Error>;
}

/// Account management driving port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountCommand: Send + Sync {
    /// Authenticate credentials, yielding the actor on success.
    async fn login(&self, credentials: &LoginCredentials) -> Result<Actor, Error>;

    /// Resolve an actor from a session user id. `None` when the account
    /// no longer exists.
    async fn actor(&self, user_id: Uuid) -> Result<Option<Actor>, Error>;

    /// Register a new account with its profile role.
    async fn register(&self, actor: &Actor, registration: Registration)
        -> Result<UserAccount, Error>;

    /// Delete an account. Self-deletion and superuser deletion are
    /// forbidden; a missing target is a no-op.
    async fn delete_user(&self, actor: &Actor, user_id: Uuid) -> Result<MutationOutcome, Error>;
}

/// Dashboard and reporting driving port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardQuery: Send + Sync {
    /// Manager overview; forbidden unless the gate admits the actor.
    async fn manager_overview(
        &self,
        actor: &Actor,
        collection_filter: Option<Uuid>,
    ) -> Result<ManagerOverview, Error>;

    /// Technician work queue.
    async fn technician_board(&self, actor: &Actor) -> Result<TechnicianBoard, Error>;

    /// Repair work queue.
    async fn repair_board(&self, actor: &Actor) -> Result<RepairBoard, Error>;

    /// Read-only status board.
    async fn viewonly_board(&self, actor: &Actor) -> Result<StatusBoard, Error>;

    /// Priority-ordered report rows for CSV export.
    async fn report_rows(&self, actor: &Actor, filter: ReportFilter)
        -> Result<Vec<ReportRow>, Error>;
}
