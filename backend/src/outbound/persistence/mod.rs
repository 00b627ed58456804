//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters with one exception**: repositories translate between
//!   Diesel rows and domain types. The exception is the status rules from
//!   [`crate::domain::rules`]: adapters apply them inside the same
//!   transaction as the triggering write so a machine's status cannot be
//!   torn from its fault and warning rows under concurrency.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are implementation details, never exposed
//!   to the domain layer.
//! - **Strongly typed errors**: every database failure maps to
//!   [`crate::domain::ports::PersistenceError`].

pub(crate) mod diesel_helpers;
mod diesel_assignment_repository;
mod diesel_collection_repository;
mod diesel_fault_repository;
mod diesel_machine_repository;
mod diesel_user_repository;
mod diesel_warning_repository;
mod models;
mod pool;
mod schema;

pub use diesel_assignment_repository::DieselAssignmentRepository;
pub use diesel_collection_repository::DieselCollectionRepository;
pub use diesel_fault_repository::DieselFaultRepository;
pub use diesel_machine_repository::DieselMachineRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_warning_repository::DieselWarningRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
