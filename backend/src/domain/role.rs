//! Roles, dashboards, and the authorization gate.
//!
//! The original system scattered role checks across each dashboard view.
//! Here the mapping from (dashboard, role) to access lives in one lookup so
//! the rules cannot drift between call sites.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Role assigned to every registered user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    /// Full administrative access: user management, machine lifecycle.
    Manager,
    /// Reports faults and raises warnings.
    Technician,
    /// Works open fault cases and clears warnings.
    Repair,
    /// Read-only visibility of machine status.
    ViewOnly,
}

/// Error returned when a stored role label is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role label: {label}")]
pub struct RoleParseError {
    /// The label that failed to parse.
    pub label: String,
}

impl Role {
    /// Canonical label persisted in the database and shown in forms.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manager => "Manager",
            Self::Technician => "Technician",
            Self::Repair => "Repair",
            Self::ViewOnly => "View-only",
        }
    }

    /// All roles, in form-display order.
    pub const ALL: [Self; 4] = [Self::Manager, Self::Technician, Self::Repair, Self::ViewOnly];
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Manager" => Ok(Self::Manager),
            "Technician" => Ok(Self::Technician),
            "Repair" => Ok(Self::Repair),
            "View-only" => Ok(Self::ViewOnly),
            other => Err(RoleParseError {
                label: other.to_owned(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role-gated dashboards exposed by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dashboard {
    /// Manager overview: statistics, assignments, user administration.
    Manager,
    /// Technician work queue.
    Technician,
    /// Repair work queue.
    Repair,
    /// Read-only status board.
    ViewOnly,
}

impl Dashboard {
    /// Redirect path used by mutating endpoints that land on this dashboard.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Manager => "/api/dashboard/manager",
            Self::Technician => "/api/dashboard/technician",
            Self::Repair => "/api/dashboard/repair",
            Self::ViewOnly => "/api/dashboard/viewonly",
        }
    }
}

/// Authenticated caller as resolved from the session and user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The authenticated user's id.
    pub user_id: Uuid,
    /// Username recorded for audit context.
    pub username: String,
    /// Profile role; `None` when the stored label was unrecognised.
    pub role: Option<Role>,
    /// Superusers bypass every dashboard gate.
    pub superuser: bool,
}

impl Actor {
    /// Post-login landing dashboard for this actor, or `None` for the
    /// home page when the role is unknown.
    pub fn landing_dashboard(&self) -> Option<Dashboard> {
        match self.role? {
            Role::Manager => Some(Dashboard::Manager),
            Role::Technician => Some(Dashboard::Technician),
            Role::Repair => Some(Dashboard::Repair),
            Role::ViewOnly => Some(Dashboard::ViewOnly),
        }
    }
}

/// Whether `role` may view `dashboard`, ignoring the superuser bypass.
///
/// The table encodes the visibility hierarchy: Manager sees everything,
/// Technician additionally sees the repair queue, and the view-only board
/// is open to every authenticated user regardless of role.
const fn role_allowed(dashboard: Dashboard, role: Role) -> bool {
    match (dashboard, role) {
        (Dashboard::Manager, Role::Manager)
        | (Dashboard::Technician, Role::Manager | Role::Technician)
        | (Dashboard::Repair, Role::Manager | Role::Technician | Role::Repair)
        | (Dashboard::ViewOnly, _) => true,
        (Dashboard::Manager | Dashboard::Technician | Dashboard::Repair, _) => false,
    }
}

/// Decide whether `actor` may view `dashboard`.
///
/// Superusers pass unconditionally. The view-only dashboard admits any
/// authenticated actor, including those with an unrecognised role label.
pub fn allowed(dashboard: Dashboard, actor: &Actor) -> bool {
    if actor.superuser {
        return true;
    }
    match actor.role {
        Some(role) => role_allowed(dashboard, role),
        None => matches!(dashboard, Dashboard::ViewOnly),
    }
}

/// Authorize `actor` for `dashboard`, yielding a forbidden error otherwise.
///
/// The forbidden result is deliberately distinct from the unauthorized
/// (not logged in) signal produced by the session layer.
pub fn authorize(dashboard: Dashboard, actor: &Actor) -> Result<(), crate::domain::Error> {
    if allowed(dashboard, actor) {
        Ok(())
    } else {
        Err(crate::domain::Error::forbidden(
            "you are not authorized to view this dashboard",
        ))
    }
}

#[cfg(test)]
mod tests {
    //! Full access-grid coverage for the authorization gate.
    use super::*;
    use rstest::rstest;

    fn actor(role: Option<Role>, superuser: bool) -> Actor {
        Actor {
            user_id: Uuid::new_v4(),
            username: "worker".to_owned(),
            role,
            superuser,
        }
    }

    #[rstest]
    #[case(Dashboard::Manager, Role::Manager, true)]
    #[case(Dashboard::Manager, Role::Technician, false)]
    #[case(Dashboard::Manager, Role::Repair, false)]
    #[case(Dashboard::Manager, Role::ViewOnly, false)]
    #[case(Dashboard::Technician, Role::Manager, true)]
    #[case(Dashboard::Technician, Role::Technician, true)]
    #[case(Dashboard::Technician, Role::Repair, false)]
    #[case(Dashboard::Technician, Role::ViewOnly, false)]
    #[case(Dashboard::Repair, Role::Manager, true)]
    #[case(Dashboard::Repair, Role::Technician, true)]
    #[case(Dashboard::Repair, Role::Repair, true)]
    #[case(Dashboard::Repair, Role::ViewOnly, false)]
    #[case(Dashboard::ViewOnly, Role::Manager, true)]
    #[case(Dashboard::ViewOnly, Role::Technician, true)]
    #[case(Dashboard::ViewOnly, Role::Repair, true)]
    #[case(Dashboard::ViewOnly, Role::ViewOnly, true)]
    fn access_grid(#[case] dashboard: Dashboard, #[case] role: Role, #[case] expected: bool) {
        assert_eq!(allowed(dashboard, &actor(Some(role), false)), expected);
    }

    #[rstest]
    #[case(Dashboard::Manager)]
    #[case(Dashboard::Technician)]
    #[case(Dashboard::Repair)]
    #[case(Dashboard::ViewOnly)]
    fn superuser_bypasses_every_gate(#[case] dashboard: Dashboard) {
        assert!(allowed(dashboard, &actor(None, true)));
    }

    #[rstest]
    fn unknown_role_only_sees_viewonly() {
        let anon_role = actor(None, false);
        assert!(!allowed(Dashboard::Manager, &anon_role));
        assert!(!allowed(Dashboard::Technician, &anon_role));
        assert!(!allowed(Dashboard::Repair, &anon_role));
        assert!(allowed(Dashboard::ViewOnly, &anon_role));
    }

    #[rstest]
    fn forbidden_error_is_distinct_from_unauthorized() {
        let err = authorize(Dashboard::Manager, &actor(Some(Role::Repair), false))
            .expect_err("repair must not see manager dashboard");
        assert_eq!(err.code(), crate::domain::ErrorCode::Forbidden);
    }

    #[rstest]
    #[case(Role::Manager, "Manager")]
    #[case(Role::Technician, "Technician")]
    #[case(Role::Repair, "Repair")]
    #[case(Role::ViewOnly, "View-only")]
    fn role_labels_round_trip(#[case] role: Role, #[case] label: &str) {
        assert_eq!(role.as_str(), label);
        assert_eq!(label.parse::<Role>().expect("parses"), role);
    }

    #[rstest]
    fn unknown_label_fails_to_parse() {
        let err = "technician".parse::<Role>().expect_err("case-sensitive");
        assert_eq!(err.label, "technician");
    }
}
