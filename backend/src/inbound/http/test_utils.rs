//! Test helpers for inbound HTTP components.

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::cookie::Key;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Ports bundle backed by expectation-free mocks.
///
/// Any call on a port a test did not override panics, so accidental
/// interactions surface immediately. Override individual fields with
/// struct-update syntax.
pub fn fixture_ports() -> crate::inbound::http::state::HttpStatePorts {
    use crate::domain::ports::{
        MockAccountCommand, MockAssignmentCommand, MockDashboardQuery, MockFaultWorkflow,
        MockMachineAdmin, MockWarningWorkflow,
    };
    use std::sync::Arc;

    crate::inbound::http::state::HttpStatePorts {
        accounts: Arc::new(MockAccountCommand::new()),
        dashboards: Arc::new(MockDashboardQuery::new()),
        faults: Arc::new(MockFaultWorkflow::new()),
        warnings: Arc::new(MockWarningWorkflow::new()),
        assignments: Arc::new(MockAssignmentCommand::new()),
        machines: Arc::new(MockMachineAdmin::new()),
    }
}

/// Persist a logged-in user id and return the session cookie for reuse in
/// subsequent requests.
pub async fn session_cookie_for(
    app: &impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
    user_id: uuid::Uuid,
) -> actix_web::cookie::Cookie<'static> {
    use actix_web::test as actix_test;

    let request = actix_test::TestRequest::get()
        .uri(SESSION_FIXTURE_PATH)
        .insert_header((SESSION_FIXTURE_HEADER, user_id.to_string()))
        .to_request();
    let response = actix_test::call_service(app, request).await;
    assert!(response.status().is_success());
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Path served by [`session_fixture_route`].
pub const SESSION_FIXTURE_PATH: &str = "/__test/session";
/// Header carrying the user id to persist.
pub const SESSION_FIXTURE_HEADER: &str = "x-test-user-id";

/// Register a route that stamps a user id into the session cookie.
pub fn session_fixture_route() -> actix_web::Resource {
    use actix_web::{web, HttpRequest, HttpResponse};

    use crate::domain::Error;
    use crate::inbound::http::session::SessionContext;

    web::resource(SESSION_FIXTURE_PATH).route(web::get().to(
        |request: HttpRequest, session: SessionContext| async move {
            let raw = request
                .headers()
                .get(SESSION_FIXTURE_HEADER)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| Error::invalid_request("missing test user header"))?;
            let user_id = uuid::Uuid::parse_str(raw)
                .map_err(|err| Error::invalid_request(format!("bad test user id: {err}")))?;
            session.persist_user(user_id)?;
            Ok::<_, Error>(HttpResponse::Ok().finish())
        },
    ))
}
