//! Machine administration handlers.
//!
//! ```text
//! POST /api/machines {"name":"press-4","description":"hydraulic press"}
//! POST /api/machines/{id}/delete
//! POST /api/machines/{id}/assign-technician {"userId":"<uuid>"}
//! POST /api/machines/{id}/assign-repair {"userId":"<uuid>"}
//! ```
//!
//! Every mutation redirects back to the manager dashboard, applied or not.

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Dashboard, Error, NewMachine};
use crate::inbound::http::redirect::to_dashboard;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Machine creation request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMachineRequest {
    /// Display name; must not be blank.
    pub name: String,
    /// Free-text description. Blank or omitted falls back to a stock
    /// placeholder.
    #[serde(default)]
    pub description: String,
    /// Optional stored image path.
    #[serde(default)]
    pub image_path: Option<String>,
    /// Existing collections to join. Unknown ids are skipped.
    #[serde(default)]
    pub collection_ids: Vec<Uuid>,
    /// Comma-separated new collection names. Invalid names are skipped.
    #[serde(default)]
    pub new_collections: Option<String>,
}

/// Description stored when the creation request carries none.
const DEFAULT_DESCRIPTION: &str = "Default description";

/// Assignment request body naming the target user.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    /// Account to place in the role slot.
    pub user_id: Uuid,
}

fn split_new_collections(raw: Option<&str>) -> Vec<String> {
    raw.map(|names| {
        names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect()
    })
    .unwrap_or_default()
}

/// Create a machine (status `OK`) and link its collections.
#[utoipa::path(
    post,
    path = "/api/machines",
    request_body = CreateMachineRequest,
    responses(
        (status = 303, description = "Machine created; redirect to the manager dashboard"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["machines"],
    operation_id = "createMachine"
)]
#[post("/machines")]
pub async fn create(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<CreateMachineRequest>,
) -> ApiResult<HttpResponse> {
    let actor = state.current_actor(&session).await?;
    let payload = payload.into_inner();
    if payload.name.trim().is_empty() {
        return Err(Error::invalid_request("machine name must not be empty")
            .with_details(json!({ "field": "name", "code": "empty_name" })));
    }
    let new_collections = split_new_collections(payload.new_collections.as_deref());
    let description = if payload.description.trim().is_empty() {
        DEFAULT_DESCRIPTION.to_owned()
    } else {
        payload.description
    };
    let machine = NewMachine {
        name: payload.name.trim().to_owned(),
        description,
        image_path: payload.image_path,
    };
    state
        .machines
        .add_machine(&actor, machine, payload.collection_ids, new_collections)
        .await?;
    Ok(to_dashboard(Dashboard::Manager))
}

/// Delete a machine, cascading to its fault cases and warnings. A missing
/// id still redirects.
#[utoipa::path(
    post,
    path = "/api/machines/{id}/delete",
    params(("id" = Uuid, Path, description = "Machine id")),
    responses(
        (status = 303, description = "Redirect to the manager dashboard"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["machines"],
    operation_id = "deleteMachine"
)]
#[post("/machines/{id}/delete")]
pub async fn delete(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = state.current_actor(&session).await?;
    state.machines.delete_machine(&actor, *path).await?;
    Ok(to_dashboard(Dashboard::Manager))
}

/// Re-assign the machine's technician slot.
#[utoipa::path(
    post,
    path = "/api/machines/{id}/assign-technician",
    params(("id" = Uuid, Path, description = "Machine id")),
    request_body = AssignRequest,
    responses(
        (status = 303, description = "Redirect to the manager dashboard"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["machines"],
    operation_id = "assignTechnician"
)]
#[post("/machines/{id}/assign-technician")]
pub async fn assign_technician(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<AssignRequest>,
) -> ApiResult<HttpResponse> {
    state.current_actor(&session).await?;
    state
        .assignments
        .assign_technician(*path, payload.user_id)
        .await?;
    Ok(to_dashboard(Dashboard::Manager))
}

/// Re-assign the machine's repair slot.
#[utoipa::path(
    post,
    path = "/api/machines/{id}/assign-repair",
    params(("id" = Uuid, Path, description = "Machine id")),
    request_body = AssignRequest,
    responses(
        (status = 303, description = "Redirect to the manager dashboard"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["machines"],
    operation_id = "assignRepair"
)]
#[post("/machines/{id}/assign-repair")]
pub async fn assign_repair(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<AssignRequest>,
) -> ApiResult<HttpResponse> {
    state.current_actor(&session).await?;
    state
        .assignments
        .assign_repair(*path, payload.user_id)
        .await?;
    Ok(to_dashboard(Dashboard::Manager))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        MockAccountCommand, MockAssignmentCommand, MockMachineAdmin, MutationOutcome,
    };
    use crate::domain::{Actor, Role};
    use crate::inbound::http::state::{HttpState, HttpStatePorts};
    use crate::inbound::http::test_utils::{
        fixture_ports, session_cookie_for, session_fixture_route, test_session_middleware,
    };
    use actix_web::http::{header, StatusCode};
    use actix_web::{test as actix_test, web, App};
    use rstest::rstest;
    use std::sync::Arc;

    fn manager_accounts() -> MockAccountCommand {
        let mut accounts = MockAccountCommand::new();
        accounts.expect_actor().returning(|id| {
            Ok(Some(Actor {
                user_id: id,
                username: "boss".to_owned(),
                role: Some(Role::Manager),
                superuser: false,
            }))
        });
        accounts
    }

    fn app_with(
        ports: HttpStatePorts,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(HttpState::new(ports)))
            .wrap(test_session_middleware())
            .service(session_fixture_route())
            .service(
                web::scope("/api")
                    .service(create)
                    .service(delete)
                    .service(assign_technician)
                    .service(assign_repair),
            )
    }

    #[rstest]
    #[case(None, vec![])]
    #[case(Some("presses, north-wing ,".to_owned()), vec!["presses".to_owned(), "north-wing".to_owned()])]
    #[case(Some("  ".to_owned()), vec![])]
    fn new_collection_names_split_on_commas(
        #[case] raw: Option<String>,
        #[case] expected: Vec<String>,
    ) {
        assert_eq!(split_new_collections(raw.as_deref()), expected);
    }

    #[actix_web::test]
    async fn creating_a_machine_redirects_to_the_manager_dashboard() {
        let user_id = uuid::Uuid::new_v4();
        let mut machines = MockMachineAdmin::new();
        machines
            .expect_add_machine()
            .withf(|_, machine, ids, names| {
                machine.name == "press-4" && ids.is_empty() && names == &["floor-2".to_owned()]
            })
            .return_once(|_, _, _, _| Ok(MutationOutcome::Applied));
        let app = actix_test::init_service(app_with(HttpStatePorts {
            accounts: Arc::new(manager_accounts()),
            machines: Arc::new(machines),
            ..fixture_ports()
        }))
        .await;
        let cookie = session_cookie_for(&app, user_id).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/machines")
            .cookie(cookie)
            .set_json(serde_json::json!({
                "name": " press-4 ",
                "description": "hydraulic press",
                "newCollections": "floor-2"
            }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/api/dashboard/manager")
        );
    }

    #[actix_web::test]
    async fn omitted_description_falls_back_to_the_stock_placeholder() {
        let user_id = uuid::Uuid::new_v4();
        let mut machines = MockMachineAdmin::new();
        machines
            .expect_add_machine()
            .withf(|_, machine, _, _| machine.description == DEFAULT_DESCRIPTION)
            .return_once(|_, _, _, _| Ok(MutationOutcome::Applied));
        let app = actix_test::init_service(app_with(HttpStatePorts {
            accounts: Arc::new(manager_accounts()),
            machines: Arc::new(machines),
            ..fixture_ports()
        }))
        .await;
        let cookie = session_cookie_for(&app, user_id).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/machines")
            .cookie(cookie)
            .set_json(serde_json::json!({ "name": "press-4" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[actix_web::test]
    async fn blank_machine_name_is_rejected() {
        let user_id = uuid::Uuid::new_v4();
        let app = actix_test::init_service(app_with(HttpStatePorts {
            accounts: Arc::new(manager_accounts()),
            ..fixture_ports()
        }))
        .await;
        let cookie = session_cookie_for(&app, user_id).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/machines")
            .cookie(cookie)
            .set_json(serde_json::json!({ "name": "   " }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn deleting_a_missing_machine_still_redirects() {
        let user_id = uuid::Uuid::new_v4();
        let mut machines = MockMachineAdmin::new();
        machines
            .expect_delete_machine()
            .return_once(|_, _| Ok(MutationOutcome::NoOp));
        let app = actix_test::init_service(app_with(HttpStatePorts {
            accounts: Arc::new(manager_accounts()),
            machines: Arc::new(machines),
            ..fixture_ports()
        }))
        .await;
        let cookie = session_cookie_for(&app, user_id).await;

        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/machines/{}/delete", uuid::Uuid::new_v4()))
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[actix_web::test]
    async fn technician_assignment_reaches_the_command_port() {
        let user_id = uuid::Uuid::new_v4();
        let machine_id = uuid::Uuid::new_v4();
        let target = uuid::Uuid::new_v4();
        let mut assignments = MockAssignmentCommand::new();
        assignments
            .expect_assign_technician()
            .withf(move |m, u| *m == machine_id && *u == target)
            .return_once(|_, _| Ok(MutationOutcome::Applied));
        let app = actix_test::init_service(app_with(HttpStatePorts {
            accounts: Arc::new(manager_accounts()),
            assignments: Arc::new(assignments),
            ..fixture_ports()
        }))
        .await;
        let cookie = session_cookie_for(&app, user_id).await;

        let request = actix_test::TestRequest::post()
            .uri(&format!("/api/machines/{machine_id}/assign-technician"))
            .cookie(cookie)
            .set_json(&AssignRequest { user_id: target })
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    #[actix_web::test]
    async fn mutations_require_a_session() {
        let app = actix_test::init_service(app_with(fixture_ports())).await;
        let request = actix_test::TestRequest::post()
            .uri("/api/machines")
            .set_json(serde_json::json!({ "name": "press" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
