//! Exclusive technician/repair assignment.
//!
//! Each machine has one technician slot and one repair slot. Re-assignment
//! clears the slot first and adds the target only when it exists and holds
//! the right role; the clear happens even when the add does not. That
//! clear-always, add-conditionally policy is deliberate and must not be
//! tightened into an error path.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::ports::{
    map_persistence_error, AssignmentCommand, AssignmentOutcome, AssignmentRepository,
    MutationOutcome,
};
use super::role::Role;
use super::Error;

/// Assignment use-cases backed by the assignment repository port.
#[derive(Clone)]
pub struct AssignmentService {
    assignments: Arc<dyn AssignmentRepository>,
}

impl AssignmentService {
    /// Create a new service with the given repository.
    pub fn new(assignments: Arc<dyn AssignmentRepository>) -> Self {
        Self { assignments }
    }

    async fn assign(
        &self,
        machine_id: Uuid,
        target_user_id: Uuid,
        role: Role,
    ) -> Result<MutationOutcome, Error> {
        let outcome = self
            .assignments
            .assign_exclusive(machine_id, target_user_id, role)
            .await
            .map_err(map_persistence_error)?;
        debug!(%machine_id, %target_user_id, %role, ?outcome, "assignment updated");
        Ok(match outcome {
            AssignmentOutcome::MachineNotFound => MutationOutcome::NoOp,
            // ClearedOnly still mutated the machine's slot; both count as
            // an applied action from the caller's point of view.
            AssignmentOutcome::ClearedOnly | AssignmentOutcome::Assigned => {
                MutationOutcome::Applied
            }
        })
    }
}

#[async_trait]
impl AssignmentCommand for AssignmentService {
    async fn assign_technician(
        &self,
        machine_id: Uuid,
        technician_id: Uuid,
    ) -> Result<MutationOutcome, Error> {
        self.assign(machine_id, technician_id, Role::Technician).await
    }

    async fn assign_repair(
        &self,
        machine_id: Uuid,
        repair_id: Uuid,
    ) -> Result<MutationOutcome, Error> {
        self.assign(machine_id, repair_id, Role::Repair).await
    }
}
