//! CSV report export.
//!
//! ```text
//! GET /api/report/export
//! GET /api/report/export?machine=<uuid>
//! GET /api/report/export?collection=<uuid>
//! ```
//!
//! Rows follow the dashboard priority order. The machine filter takes
//! precedence when both query parameters are present.

use actix_web::{get, http::header, web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::{Error, ReportFilter, ReportRow};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

const EXPORT_FILENAME: &str = "machines_report.csv";
const CSV_HEADER: [&str; 5] = [
    "Name",
    "Status",
    "Description",
    "Collections",
    "Assigned Personnel",
];

/// Query parameters selecting the export scope.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportQuery {
    /// Export a single machine.
    #[serde(default)]
    pub machine: Option<Uuid>,
    /// Export the machines in one collection.
    #[serde(default)]
    pub collection: Option<Uuid>,
}

impl From<ReportQuery> for ReportFilter {
    fn from(query: ReportQuery) -> Self {
        match (query.machine, query.collection) {
            (Some(machine), _) => Self::Machine(machine),
            (None, Some(collection)) => Self::Collection(collection),
            (None, None) => Self::All,
        }
    }
}

/// Render report rows as a CSV document.
///
/// Multi-valued cells (collections, assigned personnel) are joined with
/// `", "` inside one field; the `csv` writer handles quoting.
fn render_csv(rows: &[ReportRow]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|err| Error::internal(format!("failed to write report header: {err}")))?;
    for row in rows {
        writer
            .write_record([
                row.name.as_str(),
                row.status.as_str(),
                row.description.as_str(),
                row.collections.join(", ").as_str(),
                row.assigned.join(", ").as_str(),
            ])
            .map_err(|err| Error::internal(format!("failed to write report row: {err}")))?;
    }
    writer
        .into_inner()
        .map_err(|err| Error::internal(format!("failed to flush report: {err}")))
}

/// Export the machine report as a CSV attachment.
#[utoipa::path(
    get,
    path = "/api/report/export",
    params(
        ("machine" = Option<Uuid>, Query, description = "Export a single machine"),
        ("collection" = Option<Uuid>, Query, description = "Export one collection's machines")
    ),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv"),
        (status = 401, description = "Unauthorised", body = Error)
    ),
    tags = ["report"],
    operation_id = "exportReport"
)]
#[get("/report/export")]
pub async fn export(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ReportQuery>,
) -> ApiResult<HttpResponse> {
    let actor = state.current_actor(&session).await?;
    let rows = state
        .dashboards
        .report_rows(&actor, ReportFilter::from(query.into_inner()))
        .await?;
    let body = render_csv(&rows)?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/csv; charset=utf-8"))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{EXPORT_FILENAME}\""),
        ))
        .body(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockAccountCommand, MockDashboardQuery};
    use crate::domain::{Actor, Role};
    use crate::inbound::http::state::{HttpState, HttpStatePorts};
    use crate::inbound::http::test_utils::{
        fixture_ports, session_cookie_for, session_fixture_route, test_session_middleware,
    };
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, web, App};
    use rstest::rstest;
    use std::sync::Arc;

    fn row(name: &str) -> ReportRow {
        ReportRow {
            name: name.to_owned(),
            status: "Fault".to_owned(),
            description: "broken, needs parts".to_owned(),
            collections: vec!["presses".to_owned(), "north-wing".to_owned()],
            assigned: vec!["casey".to_owned()],
        }
    }

    #[rstest]
    #[case(ReportQuery::default(), ReportFilter::All)]
    #[case(
        ReportQuery { machine: Some(Uuid::nil()), collection: Some(Uuid::max()) },
        ReportFilter::Machine(Uuid::nil())
    )]
    #[case(
        ReportQuery { machine: None, collection: Some(Uuid::nil()) },
        ReportFilter::Collection(Uuid::nil())
    )]
    fn machine_filter_takes_precedence(#[case] query: ReportQuery, #[case] expected: ReportFilter) {
        assert_eq!(ReportFilter::from(query), expected);
    }

    #[rstest]
    fn csv_quotes_multi_valued_cells() {
        let body = render_csv(&[row("press-4")]).expect("renders");
        let text = String::from_utf8(body).expect("utf8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Name,Status,Description,Collections,Assigned Personnel")
        );
        assert_eq!(
            lines.next(),
            Some("press-4,Fault,\"broken, needs parts\",\"presses, north-wing\",casey")
        );
    }

    #[actix_web::test]
    async fn export_sets_the_attachment_headers() {
        let user_id = uuid::Uuid::new_v4();
        let mut accounts = MockAccountCommand::new();
        accounts.expect_actor().returning(|id| {
            Ok(Some(Actor {
                user_id: id,
                username: "viewer".to_owned(),
                role: Some(Role::ViewOnly),
                superuser: false,
            }))
        });
        let mut dashboards = MockDashboardQuery::new();
        dashboards
            .expect_report_rows()
            .withf(|_, filter| *filter == ReportFilter::All)
            .return_once(|_, _| Ok(vec![row("press-4")]));
        let state = HttpState::new(HttpStatePorts {
            accounts: Arc::new(accounts),
            dashboards: Arc::new(dashboards),
            ..fixture_ports()
        });
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .wrap(test_session_middleware())
                .service(session_fixture_route())
                .service(web::scope("/api").service(export)),
        )
        .await;
        let cookie = session_cookie_for(&app, user_id).await;

        let request = actix_test::TestRequest::get()
            .uri("/api/report/export")
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(actix_web::http::header::CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok()),
            Some("attachment; filename=\"machines_report.csv\"")
        );
        let body = actix_test::read_body(response).await;
        assert!(body.starts_with(b"Name,Status,Description"));
    }
}
