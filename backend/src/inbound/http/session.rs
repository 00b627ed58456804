//! Session access for HTTP handlers.
//!
//! Wraps the Actix session so handlers read and write the logged-in user id
//! without touching cookie internals. An undecodable stored id counts as an
//! anonymous request, not a server error.

use actix_session::Session;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;
use uuid::Uuid;

use crate::domain::Error;

const USER_ID_KEY: &str = "user_id";

/// Extractor exposing the session-scoped identity operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Record a successful login in the session cookie.
    pub fn persist_user(&self, user_id: Uuid) -> Result<(), Error> {
        self.0
            .insert(USER_ID_KEY, user_id)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The logged-in user id, or `401 Unauthorized` when there is none.
    pub fn require_user_id(&self) -> Result<Uuid, Error> {
        match self.0.get::<Uuid>(USER_ID_KEY) {
            Ok(Some(id)) => Ok(id),
            Ok(None) => Err(Error::unauthorized("login required")),
            Err(error) => {
                warn!(%error, "session carried an undecodable user id");
                Err(Error::unauthorized("login required"))
            }
        }
    }

    /// Drop all session state, ending the login.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let session = Session::from_request(req, payload);
        Box::pin(async move { session.await.map(Self) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};

    use crate::inbound::http::test_utils::test_session_middleware;

    const FIXTURE_ID: &str = "1d8e2f40-9d2c-4d8a-9a1c-5b9f3f0e6c21";

    /// App with one route per session operation under test.
    fn harness() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .wrap(test_session_middleware())
            .route(
                "/login",
                web::get().to(|session: SessionContext| async move {
                    let id = Uuid::parse_str(FIXTURE_ID).expect("fixture id");
                    session.persist_user(id)?;
                    Ok::<_, Error>(HttpResponse::Ok())
                }),
            )
            .route(
                "/whoami",
                web::get().to(|session: SessionContext| async move {
                    let id = session.require_user_id()?;
                    Ok::<_, Error>(HttpResponse::Ok().body(id.to_string()))
                }),
            )
            .route(
                "/logout",
                web::get().to(|session: SessionContext| async move {
                    session.clear();
                    HttpResponse::Ok()
                }),
            )
            .route(
                "/taint",
                web::get().to(|session: Session| async move {
                    session
                        .insert(USER_ID_KEY, "definitely-not-a-uuid")
                        .expect("taint session");
                    HttpResponse::Ok()
                }),
            )
    }

    /// Hit `path` and return the session cookie the response sets.
    async fn cookie_from(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        path: &str,
        carry: Option<actix_web::cookie::Cookie<'static>>,
    ) -> actix_web::cookie::Cookie<'static> {
        let mut request = test::TestRequest::get().uri(path);
        if let Some(cookie) = carry {
            request = request.cookie(cookie);
        }
        let response = test::call_service(app, request.to_request()).await;
        assert!(response.status().is_success());
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[actix_web::test]
    async fn whoami_returns_the_persisted_id() {
        let app = test::init_service(harness()).await;
        let cookie = cookie_from(&app, "/login", None).await;

        let request = test::TestRequest::get()
            .uri("/whoami")
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(test::read_body(response).await, FIXTURE_ID);
    }

    #[actix_web::test]
    async fn anonymous_requests_are_unauthorised() {
        let app = test::init_service(harness()).await;
        let request = test::TestRequest::get().uri("/whoami").to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_discards_the_session() {
        let app = test::init_service(harness()).await;
        let cookie = cookie_from(&app, "/login", None).await;
        let cleared = cookie_from(&app, "/logout", Some(cookie)).await;

        let request = test::TestRequest::get()
            .uri("/whoami")
            .cookie(cleared)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn undecodable_stored_id_is_unauthorised() {
        let app = test::init_service(harness()).await;
        let cookie = cookie_from(&app, "/taint", None).await;

        let request = test::TestRequest::get()
            .uri("/whoami")
            .cookie(cookie)
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
