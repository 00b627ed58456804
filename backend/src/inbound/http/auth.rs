//! Login and logout handlers.
//!
//! ```text
//! POST /api/login {"username":"casey","password":"secret"}
//! POST /api/logout
//! ```
//!
//! A successful login answers `303 See Other` pointing at the actor's
//! landing dashboard so browser form posts land on the right board.

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{Error, LoginCredentials};
use crate::domain::auth::LoginValidationError;
use crate::inbound::http::redirect::{see_other, to_dashboard};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Login request body for `POST /api/login`.
///
/// Example JSON:
/// `{"username":"casey","password":"secret"}`
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Authenticate credentials, establish a session, and redirect to the
/// actor's landing dashboard. Actors with an unrecognised role land on
/// the home page instead.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Login success; redirect to the landing dashboard"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let actor = state.accounts.login(&credentials).await?;
    session.persist_user(actor.user_id)?;
    Ok(match actor.landing_dashboard() {
        Some(dashboard) => to_dashboard(dashboard),
        None => see_other("/"),
    })
}

/// Drop the session and redirect to the home page.
#[utoipa::path(
    post,
    path = "/api/logout",
    responses(
        (status = 303, description = "Session ended; redirect home")
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(see_other("/"))
}
