//! Domain primitives, rules, ports, and services.
//!
//! Purpose: Define strongly typed domain entities, the status/priority
//! rules that govern machine tracking, the ports at the hexagon's edges,
//! and the services implementing the use-case surface. Keep types
//! immutable and document invariants and serialisation contracts (serde)
//! in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode (aliases to `error::*`) — API error response payload.
//! - Entities: `Machine`, `FaultCase`, `FaultNote`, `Warning`,
//!   `Collection`, `UserAccount`.
//! - `rules` — pure status transition and priority-ordering functions.
//! - `ports` — driven and driving trait seams.
//! - Services: `TrackingService`, `AssignmentService`, `MachineService`,
//!   `DirectoryService`, `DashboardService`.

pub mod auth;
pub mod collection;
pub mod error;
pub mod fault;
pub mod machine;
pub mod ports;
pub mod role;
pub mod rules;
pub mod views;
pub mod warning;

pub mod assignment_service;
pub mod dashboard_service;
pub mod directory_service;
pub mod machine_service;
pub mod tracking_service;

pub use self::assignment_service::AssignmentService;
pub use self::auth::{LoginCredentials, Registration, UserAccount, Username};
pub use self::collection::{Collection, CollectionName};
pub use self::dashboard_service::{DashboardPorts, DashboardService};
pub use self::directory_service::DirectoryService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::fault::{FaultCase, FaultNote, FaultStatus, NoteContent};
pub use self::machine::{Machine, MachineStatus, NewMachine};
pub use self::machine_service::MachineService;
pub use self::role::{Actor, Dashboard, Role};
pub use self::tracking_service::TrackingService;
pub use self::views::{
    ManagerOverview, RepairBoard, ReportFilter, ReportRow, StatusBoard, StatusCounts,
    TechnicianBoard,
};
pub use self::warning::{Warning, WarningText};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use machtrack::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
