//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod dashboards;
pub mod error;
pub mod faults;
pub mod machines;
pub mod redirect;
pub mod report;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod warnings;

pub use error::ApiResult;
