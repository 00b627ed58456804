//! Warning handlers.
//!
//! ```text
//! POST /api/warnings {"machineId":"<uuid>","warningText":"oil low"}
//! POST /api/warnings/{id}/delete
//! ```
//!
//! Raising a warning redirects to the technician board; clearing one
//! redirects to the repair board.

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Dashboard, Error};
use crate::inbound::http::redirect::to_dashboard;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Warning creation request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateWarningRequest {
    /// Machine the warning concerns.
    pub machine_id: Uuid,
    /// Warning text; trimmed, bounded, deduplicated case-insensitively.
    pub warning_text: String,
}

/// Raise a warning; the machine moves to `Warning` even when an identical
/// warning is already active.
#[utoipa::path(
    post,
    path = "/api/warnings",
    request_body = CreateWarningRequest,
    responses(
        (status = 303, description = "Redirect to the technician board"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["warnings"],
    operation_id = "createWarning"
)]
#[post("/warnings")]
pub async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateWarningRequest>,
) -> ApiResult<HttpResponse> {
    let actor = state.current_actor(&session).await?;
    let payload = payload.into_inner();
    state
        .warnings
        .create_warning(actor.user_id, payload.machine_id, payload.warning_text)
        .await?;
    Ok(to_dashboard(Dashboard::Technician))
}

/// Clear a warning; the machine resets to `OK` when it was the last active
/// one. A missing id still redirects.
#[utoipa::path(
    post,
    path = "/api/warnings/{id}/delete",
    params(("id" = Uuid, Path, description = "Warning id")),
    responses(
        (status = 303, description = "Redirect to the repair board"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["warnings"],
    operation_id = "deleteWarning"
)]
#[post("/warnings/{id}/delete")]
pub async fn delete(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.current_actor(&session).await?;
    state.warnings.delete_warning(*path).await?;
    Ok(to_dashboard(Dashboard::Repair))
}
