//! Dashboard handlers.
//!
//! ```text
//! GET /api/dashboard/manager?collection=<uuid>
//! GET /api/dashboard/technician
//! GET /api/dashboard/repair
//! GET /api/dashboard/viewonly
//! ```
//!
//! Gates: manager only; manager or technician; manager, technician, or
//! repair; any authenticated actor. Superusers pass every gate.

use actix_web::{get, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{ManagerOverview, RepairBoard, StatusBoard, TechnicianBoard};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Query parameters for the manager overview.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ManagerOverviewQuery {
    /// Restrict the machine listing to one collection.
    #[serde(default)]
    pub collection: Option<Uuid>,
}

/// Manager overview: fleet statistics, recent fault cases, assignment and
/// user administration data.
#[utoipa::path(
    get,
    path = "/api/dashboard/manager",
    params(
        ("collection" = Option<Uuid>, Query, description = "Restrict the machine listing to one collection")
    ),
    responses(
        (status = 200, description = "Manager overview", body = ManagerOverview),
        (status = 401, description = "Unauthorised", body = crate::domain::Error),
        (status = 403, description = "Forbidden", body = crate::domain::Error)
    ),
    tags = ["dashboards"],
    operation_id = "managerDashboard"
)]
#[get("/dashboard/manager")]
pub async fn manager(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ManagerOverviewQuery>,
) -> ApiResult<web::Json<ManagerOverview>> {
    let actor = state.current_actor(&session).await?;
    let overview = state
        .dashboards
        .manager_overview(&actor, query.collection)
        .await?;
    Ok(web::Json(overview))
}

/// Technician work queue: assigned machines and outstanding fault cases.
#[utoipa::path(
    get,
    path = "/api/dashboard/technician",
    responses(
        (status = 200, description = "Technician board", body = TechnicianBoard),
        (status = 401, description = "Unauthorised", body = crate::domain::Error),
        (status = 403, description = "Forbidden", body = crate::domain::Error)
    ),
    tags = ["dashboards"],
    operation_id = "technicianDashboard"
)]
#[get("/dashboard/technician")]
pub async fn technician(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<TechnicianBoard>> {
    let actor = state.current_actor(&session).await?;
    let board = state.dashboards.technician_board(&actor).await?;
    Ok(web::Json(board))
}

/// Repair work queue: outstanding fault cases and active warnings.
#[utoipa::path(
    get,
    path = "/api/dashboard/repair",
    responses(
        (status = 200, description = "Repair board", body = RepairBoard),
        (status = 401, description = "Unauthorised", body = crate::domain::Error),
        (status = 403, description = "Forbidden", body = crate::domain::Error)
    ),
    tags = ["dashboards"],
    operation_id = "repairDashboard"
)]
#[get("/dashboard/repair")]
pub async fn repair(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<RepairBoard>> {
    let actor = state.current_actor(&session).await?;
    let board = state.dashboards.repair_board(&actor).await?;
    Ok(web::Json(board))
}

/// Read-only status board, open to every authenticated actor.
#[utoipa::path(
    get,
    path = "/api/dashboard/viewonly",
    responses(
        (status = 200, description = "Status board", body = StatusBoard),
        (status = 401, description = "Unauthorised", body = crate::domain::Error)
    ),
    tags = ["dashboards"],
    operation_id = "viewonlyDashboard"
)]
#[get("/dashboard/viewonly")]
pub async fn viewonly(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<StatusBoard>> {
    let actor = state.current_actor(&session).await?;
    let board = state.dashboards.viewonly_board(&actor).await?;
    Ok(web::Json(board))
}
