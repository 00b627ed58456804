//! Post/redirect/get helpers.
//!
//! Mutating endpoints answer `303 See Other` pointing back at the dashboard
//! the actor came from, whether or not the write took effect. Missing ids
//! therefore never surface as errors on these paths.

use actix_web::{http::header, HttpResponse};

use crate::domain::Dashboard;

/// Build a `303 See Other` response pointing at `location`.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Redirect to a dashboard's canonical path.
pub fn to_dashboard(dashboard: Dashboard) -> HttpResponse {
    see_other(dashboard.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use rstest::rstest;

    #[rstest]
    #[case(Dashboard::Manager, "/api/dashboard/manager")]
    #[case(Dashboard::Technician, "/api/dashboard/technician")]
    #[case(Dashboard::Repair, "/api/dashboard/repair")]
    #[case(Dashboard::ViewOnly, "/api/dashboard/viewonly")]
    fn dashboard_redirects_carry_the_location(#[case] dashboard: Dashboard, #[case] path: &str) {
        let response = to_dashboard(dashboard);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(actix_web::http::header::LOCATION)
            .and_then(|v| v.to_str().ok());
        assert_eq!(location, Some(path));
    }
}
