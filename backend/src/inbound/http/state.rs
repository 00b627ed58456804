//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AssignmentCommand, DashboardQuery, FaultWorkflow, MachineAdmin,
    WarningWorkflow,
};
use crate::domain::{Actor, Error};
use crate::inbound::http::session::SessionContext;

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub accounts: Arc<dyn AccountCommand>,
    pub dashboards: Arc<dyn DashboardQuery>,
    pub faults: Arc<dyn FaultWorkflow>,
    pub warnings: Arc<dyn WarningWorkflow>,
    pub assignments: Arc<dyn AssignmentCommand>,
    pub machines: Arc<dyn MachineAdmin>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub dashboards: Arc<dyn DashboardQuery>,
    pub faults: Arc<dyn FaultWorkflow>,
    pub warnings: Arc<dyn WarningWorkflow>,
    pub assignments: Arc<dyn AssignmentCommand>,
    pub machines: Arc<dyn MachineAdmin>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            accounts,
            dashboards,
            faults,
            warnings,
            assignments,
            machines,
        } = ports;
        Self {
            accounts,
            dashboards,
            faults,
            warnings,
            assignments,
            machines,
        }
    }

    /// Resolve the session's user id into a live actor.
    ///
    /// A session pointing at a deleted account is treated the same as no
    /// session at all.
    pub async fn current_actor(&self, session: &SessionContext) -> Result<Actor, Error> {
        let user_id = session.require_user_id()?;
        match self.accounts.actor(user_id).await? {
            Some(actor) => Ok(actor),
            None => {
                session.clear();
                Err(Error::unauthorized("login required"))
            }
        }
    }
}
