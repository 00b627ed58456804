//! Fault case handlers.
//!
//! ```text
//! POST /api/faults {"machineId":"<uuid>","title":"spindle stalls"}
//! POST /api/faults/{id}/notes {"note":"ordered part"}
//! POST /api/faults/{id}/progress
//! POST /api/faults/{id}/resolve
//! ```
//!
//! Reporting and note-taking redirect to the technician board; progress and
//! resolution redirect to the repair board. Missing ids still redirect.

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Dashboard, Error};
use crate::inbound::http::redirect::to_dashboard;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Fault report request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportFaultRequest {
    /// Machine the fault was observed on.
    pub machine_id: Uuid,
    /// Optional short summary.
    #[serde(default)]
    pub title: Option<String>,
}

/// Fault note request body. Both fields optional; an empty note is dropped.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaultNoteRequest {
    /// Free-text note.
    #[serde(default)]
    pub note: Option<String>,
    /// Optional stored image path.
    #[serde(default)]
    pub image_path: Option<String>,
}

/// Report a fault; the machine moves to `Fault` regardless of its current
/// status.
#[utoipa::path(
    post,
    path = "/api/faults",
    request_body = ReportFaultRequest,
    responses(
        (status = 303, description = "Redirect to the technician board"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["faults"],
    operation_id = "reportFault"
)]
#[post("/faults")]
pub async fn report(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ReportFaultRequest>,
) -> ApiResult<HttpResponse> {
    let actor = state.current_actor(&session).await?;
    let payload = payload.into_inner();
    state
        .faults
        .report_fault(actor.user_id, payload.machine_id, payload.title)
        .await?;
    Ok(to_dashboard(Dashboard::Technician))
}

/// Append a note to a fault case. A note with no text and no image is a
/// silent no-op.
#[utoipa::path(
    post,
    path = "/api/faults/{id}/notes",
    params(("id" = Uuid, Path, description = "Fault case id")),
    request_body = FaultNoteRequest,
    responses(
        (status = 303, description = "Redirect to the technician board"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["faults"],
    operation_id = "addFaultNote"
)]
#[post("/faults/{id}/notes")]
pub async fn add_note(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<FaultNoteRequest>,
) -> ApiResult<HttpResponse> {
    let actor = state.current_actor(&session).await?;
    let payload = payload.into_inner();
    state
        .faults
        .add_fault_note(actor.user_id, *path, payload.note, payload.image_path)
        .await?;
    Ok(to_dashboard(Dashboard::Technician))
}

/// Move an open fault case to `in_progress`. Machine status is untouched.
#[utoipa::path(
    post,
    path = "/api/faults/{id}/progress",
    params(("id" = Uuid, Path, description = "Fault case id")),
    responses(
        (status = 303, description = "Redirect to the repair board"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["faults"],
    operation_id = "startFaultProgress"
)]
#[post("/faults/{id}/progress")]
pub async fn start_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.current_actor(&session).await?;
    state.faults.start_fault_progress(*path).await?;
    Ok(to_dashboard(Dashboard::Repair))
}

/// Resolve a fault case; the machine resets to `OK`.
#[utoipa::path(
    post,
    path = "/api/faults/{id}/resolve",
    params(("id" = Uuid, Path, description = "Fault case id")),
    responses(
        (status = 303, description = "Redirect to the repair board"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["faults"],
    operation_id = "resolveFault"
)]
#[post("/faults/{id}/resolve")]
pub async fn resolve(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.current_actor(&session).await?;
    state.faults.resolve_fault(*path).await?;
    Ok(to_dashboard(Dashboard::Repair))
}
