//! Machtrack backend library.
//!
//! The crate follows a hexagonal layout: `domain` holds the entities,
//! rules, and ports; `inbound` adapts HTTP onto the driving ports;
//! `outbound` implements the driven ports against PostgreSQL and the
//! password hasher; `server` wires the layers together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
