//! Fault and warning workflows.
//!
//! Thin orchestration over the transactional repository ports: validation
//! and error mapping happen here, while the status transitions themselves
//! are applied by the adapters from [`crate::domain::rules`] inside the
//! same transaction as the triggering write.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::fault::NoteContent;
use super::ports::{
    map_persistence_error, FaultCaseRepository, FaultWorkflow, MutationOutcome, WarningRepository,
    WarningWorkflow,
};
use super::warning::{WarningText, WarningValidationError};
use super::Error;

/// Fault and warning use-cases backed by repository ports.
#[derive(Clone)]
pub struct TrackingService {
    faults: Arc<dyn FaultCaseRepository>,
    warnings: Arc<dyn WarningRepository>,
}

impl TrackingService {
    /// Create a new service with the given repositories.
    pub fn new(faults: Arc<dyn FaultCaseRepository>, warnings: Arc<dyn WarningRepository>) -> Self {
        Self { faults, warnings }
    }
}

fn map_warning_validation_error(err: WarningValidationError) -> Error {
    let code = match err {
        WarningValidationError::EmptyText => "empty_warning_text",
        WarningValidationError::TextTooLong => "warning_text_too_long",
    };
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": "warningText", "code": code }))
}

#[async_trait]
impl FaultWorkflow for TrackingService {
    async fn report_fault(
        &self,
        actor_id: Uuid,
        machine_id: Uuid,
        title: Option<String>,
    ) -> Result<MutationOutcome, Error> {
        let created = self
            .faults
            .create_open(machine_id, actor_id, title)
            .await
            .map_err(map_persistence_error)?;
        match created {
            Some(fault) => {
                debug!(fault_id = %fault.id, %machine_id, "fault case opened");
                Ok(MutationOutcome::Applied)
            }
            None => {
                debug!(%machine_id, "fault report against missing machine ignored");
                Ok(MutationOutcome::NoOp)
            }
        }
    }

    async fn add_fault_note(
        &self,
        actor_id: Uuid,
        fault_id: Uuid,
        note: Option<String>,
        image_path: Option<String>,
    ) -> Result<MutationOutcome, Error> {
        // A note with neither text nor image is silently dropped, matching
        // the original form handling.
        let Some(content) = NoteContent::from_parts(note, image_path) else {
            return Ok(MutationOutcome::NoOp);
        };
        let added = self
            .faults
            .add_note(fault_id, content, actor_id)
            .await
            .map_err(map_persistence_error)?;
        Ok(match added {
            Some(_) => MutationOutcome::Applied,
            None => MutationOutcome::NoOp,
        })
    }

    async fn start_fault_progress(&self, fault_id: Uuid) -> Result<MutationOutcome, Error> {
        let moved = self
            .faults
            .start_progress(fault_id)
            .await
            .map_err(map_persistence_error)?;
        Ok(if moved {
            MutationOutcome::Applied
        } else {
            MutationOutcome::NoOp
        })
    }

    async fn resolve_fault(&self, fault_id: Uuid) -> Result<MutationOutcome, Error> {
        let resolved = self
            .faults
            .resolve(fault_id)
            .await
            .map_err(map_persistence_error)?;
        Ok(if resolved {
            MutationOutcome::Applied
        } else {
            MutationOutcome::NoOp
        })
    }
}

#[async_trait]
impl WarningWorkflow for TrackingService {
    async fn create_warning(
        &self,
        actor_id: Uuid,
        machine_id: Uuid,
        text: String,
    ) -> Result<MutationOutcome, Error> {
        let text = WarningText::new(text).map_err(map_warning_validation_error)?;
        let created = self
            .warnings
            .create_active(machine_id, text, actor_id)
            .await
            .map_err(map_persistence_error)?;
        match created {
            Some(outcome) => {
                debug!(%machine_id, ?outcome, "warning raised");
                Ok(MutationOutcome::Applied)
            }
            None => Ok(MutationOutcome::NoOp),
        }
    }

    async fn delete_warning(&self, warning_id: Uuid) -> Result<MutationOutcome, Error> {
        let deleted = self
            .warnings
            .delete(warning_id)
            .await
            .map_err(map_persistence_error)?;
        Ok(if deleted {
            MutationOutcome::Applied
        } else {
            MutationOutcome::NoOp
        })
    }
}
