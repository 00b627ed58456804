//! User administration handlers.
//!
//! ```text
//! POST /api/users {"username":"casey","password":"pw","confirmPassword":"pw","role":"Repair"}
//! POST /api/users/{id}/delete
//! ```
//!
//! Both are manager-only and redirect back to the manager dashboard.

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::auth::RegistrationValidationError;
use crate::domain::{Dashboard, Error, Registration};
use crate::inbound::http::redirect::to_dashboard;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Registration request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    /// One of `Manager`, `Technician`, `Repair`, `View-only`.
    pub role: String,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = RegistrationValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(
            &value.username,
            &value.password,
            &value.confirm_password,
            &value.role,
        )
    }
}

fn map_registration_error(err: RegistrationValidationError) -> Error {
    let (field, code) = match &err {
        RegistrationValidationError::Username(_) => ("username", "invalid_username"),
        RegistrationValidationError::EmptyPassword => ("password", "empty_password"),
        RegistrationValidationError::PasswordMismatch => ("confirmPassword", "password_mismatch"),
        RegistrationValidationError::UnknownRole => ("role", "unknown_role"),
    };
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": field, "code": code }))
}

/// Register a new account with its profile role.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 303, description = "Account created; redirect to the manager dashboard"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 409, description = "Username already registered", body = Error)
    ),
    tags = ["users"],
    operation_id = "registerUser"
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let actor = state.current_actor(&session).await?;
    let registration =
        Registration::try_from(payload.into_inner()).map_err(map_registration_error)?;
    state.accounts.register(&actor, registration).await?;
    Ok(to_dashboard(Dashboard::Manager))
}

/// Delete an account. Self-deletion and superuser deletion are forbidden;
/// a missing target still redirects.
#[utoipa::path(
    post,
    path = "/api/users/{id}/delete",
    params(("id" = Uuid, Path, description = "Account id")),
    responses(
        (status = 303, description = "Redirect to the manager dashboard"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[post("/users/{id}/delete")]
pub async fn delete(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let actor = state.current_actor(&session).await?;
    state.accounts.delete_user(&actor, *path).await?;
    Ok(to_dashboard(Dashboard::Manager))
}
