//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] aggregate that generates the OpenAPI
//! specification for the REST API: every inbound endpoint, the shared
//! domain schemas, and the session cookie security scheme. The generated
//! document backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Machtrack backend API",
        description = "Factory machinery status and repair tracking."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::dashboards::manager,
        crate::inbound::http::dashboards::technician,
        crate::inbound::http::dashboards::repair,
        crate::inbound::http::dashboards::viewonly,
        crate::inbound::http::faults::report,
        crate::inbound::http::faults::add_note,
        crate::inbound::http::faults::start_progress,
        crate::inbound::http::faults::resolve,
        crate::inbound::http::warnings::create,
        crate::inbound::http::warnings::delete,
        crate::inbound::http::machines::create,
        crate::inbound::http::machines::delete,
        crate::inbound::http::machines::assign_technician,
        crate::inbound::http::machines::assign_repair,
        crate::inbound::http::users::register,
        crate::inbound::http::users::delete,
        crate::inbound::http::report::export,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::Machine,
        crate::domain::MachineStatus,
        crate::domain::FaultCase,
        crate::domain::FaultNote,
        crate::domain::FaultStatus,
        crate::domain::Warning,
        crate::domain::Collection,
        crate::domain::UserAccount,
        crate::domain::Role,
        crate::domain::views::StatusCounts,
        crate::domain::views::ManagerOverview,
        crate::domain::views::TechnicianBoard,
        crate::domain::views::RepairBoard,
        crate::domain::views::StatusBoard,
        crate::domain::views::ReportRow,
        crate::inbound::http::auth::LoginRequest,
        crate::inbound::http::faults::ReportFaultRequest,
        crate::inbound::http::faults::FaultNoteRequest,
        crate::inbound::http::warnings::CreateWarningRequest,
        crate::inbound::http::machines::CreateMachineRequest,
        crate::inbound::http::machines::AssignRequest,
        crate::inbound::http::users::RegisterRequest,
    )),
    tags(
        (name = "auth", description = "Login and logout"),
        (name = "dashboards", description = "Role-gated dashboard views"),
        (name = "faults", description = "Fault case lifecycle and notes"),
        (name = "warnings", description = "Advisory warnings"),
        (name = "machines", description = "Machine administration and assignment"),
        (name = "users", description = "Account administration"),
        (name = "report", description = "CSV status export")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document structure.
    use super::*;

    #[test]
    fn openapi_registers_every_endpoint() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        for path in [
            "/api/login",
            "/api/logout",
            "/api/dashboard/manager",
            "/api/dashboard/technician",
            "/api/dashboard/repair",
            "/api/dashboard/viewonly",
            "/api/faults",
            "/api/faults/{id}/notes",
            "/api/faults/{id}/progress",
            "/api/faults/{id}/resolve",
            "/api/warnings",
            "/api/warnings/{id}/delete",
            "/api/machines",
            "/api/machines/{id}/delete",
            "/api/machines/{id}/assign-technician",
            "/api/machines/{id}/assign-repair",
            "/api/users",
            "/api/users/{id}/delete",
            "/api/report/export",
        ] {
            assert!(paths.contains_key(path), "missing path {path}");
        }
    }

    #[test]
    fn openapi_registers_domain_schemas() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;

        for name in ["Machine", "FaultCase", "Warning", "ManagerOverview", "Error"] {
            assert!(schemas.contains_key(name), "missing schema {name}");
        }
    }
}
