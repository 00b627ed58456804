//! Server construction and middleware wiring.

mod config;

pub use config::{Cli, ServerConfig};

use std::sync::Arc;

use actix_session::config::CookieContentSecurity;
use actix_session::storage::CookieSessionStore;
use actix_session::SessionMiddleware;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpServer};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::{
    AssignmentService, DashboardPorts, DashboardService, DirectoryService, MachineService,
    TrackingService,
};
use crate::inbound::http::session_config::SessionSettings;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::{auth, dashboards, faults, machines, report, users, warnings};
use crate::outbound::persistence::{
    DbPool, DieselAssignmentRepository, DieselCollectionRepository, DieselFaultRepository,
    DieselMachineRepository, DieselUserRepository, DieselWarningRepository,
};
use crate::outbound::security::Argon2PasswordHasher;

/// Wire the Diesel repositories into the domain services behind the
/// driving ports consumed by the HTTP handlers.
fn build_http_state(pool: &DbPool) -> HttpState {
    let machine_repo = Arc::new(DieselMachineRepository::new(pool.clone()));
    let fault_repo = Arc::new(DieselFaultRepository::new(pool.clone()));
    let warning_repo = Arc::new(DieselWarningRepository::new(pool.clone()));
    let collection_repo = Arc::new(DieselCollectionRepository::new(pool.clone()));
    let user_repo = Arc::new(DieselUserRepository::new(pool.clone()));
    let assignment_repo = Arc::new(DieselAssignmentRepository::new(pool.clone()));

    // One tracking service backs both the fault and warning workflows.
    let tracking = Arc::new(TrackingService::new(fault_repo.clone(), warning_repo.clone()));
    let directory = Arc::new(DirectoryService::new(
        user_repo.clone(),
        Arc::new(Argon2PasswordHasher::new()),
    ));
    let dashboard = Arc::new(DashboardService::new(DashboardPorts {
        machines: machine_repo.clone(),
        faults: fault_repo,
        warnings: warning_repo,
        collections: collection_repo.clone(),
        users: user_repo,
        assignments: assignment_repo.clone(),
    }));

    HttpState::from(HttpStatePorts {
        accounts: directory,
        dashboards: dashboard,
        faults: tracking.clone(),
        warnings: tracking,
        assignments: Arc::new(AssignmentService::new(assignment_repo)),
        machines: Arc::new(MachineService::new(machine_repo, collection_repo)),
    })
}

#[derive(Clone)]
struct AppDependencies {
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .build();

    let api = web::scope("/api")
        .wrap(session)
        .service(auth::login)
        .service(auth::logout)
        .service(dashboards::manager)
        .service(dashboards::technician)
        .service(dashboards::repair)
        .service(dashboards::viewonly)
        .service(faults::report)
        .service(faults::add_note)
        .service(faults::start_progress)
        .service(faults::resolve)
        .service(warnings::create)
        .service(warnings::delete)
        .service(machines::create)
        .service(machines::delete)
        .service(machines::assign_technician)
        .service(machines::assign_repair)
        .service(users::register)
        .service(users::delete)
        .service(report::export);

    let app = App::new().app_data(http_state).service(api);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server from the provided configuration.
///
/// # Errors
///
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = web::Data::new(build_http_state(&config.db_pool));
    let ServerConfig {
        session,
        bind_addr,
        db_pool: _,
    } = config;
    let SessionSettings {
        key,
        cookie_secure,
        same_site,
    } = session;

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        })
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
