//! Application route surface and role landing pages.

use tracing::warn;

use super::types::Role;

pub const LOGIN: &str = "/auth/login";
pub const REGISTER: &str = "/auth/register";
pub const DASHBOARD: &str = "/dashboard";
pub const MANAGER_DASHBOARD: &str = "/dashboard/manager";
pub const EMPLOYEE_DASHBOARD: &str = "/dashboard/employee";
pub const RESTRICTED_DASHBOARD: &str = "/dashboard/restricted";

/// A known route and who may see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteSpec {
    pub path: &'static str,
    pub requires_auth: bool,
    /// Empty means any authenticated role
    pub allowed_roles: &'static [Role],
}

impl RouteSpec {
    pub fn allows(&self, role: Role) -> bool {
        self.allowed_roles.is_empty() || self.allowed_roles.contains(&role)
    }
}

pub const ROUTES: &[RouteSpec] = &[
    RouteSpec {
        path: LOGIN,
        requires_auth: false,
        allowed_roles: &[],
    },
    RouteSpec {
        path: REGISTER,
        requires_auth: false,
        allowed_roles: &[],
    },
    RouteSpec {
        path: DASHBOARD,
        requires_auth: true,
        allowed_roles: &[],
    },
    RouteSpec {
        path: MANAGER_DASHBOARD,
        requires_auth: true,
        allowed_roles: &[Role::Manager],
    },
    RouteSpec {
        path: EMPLOYEE_DASHBOARD,
        requires_auth: true,
        allowed_roles: &[Role::Employee],
    },
    RouteSpec {
        path: RESTRICTED_DASHBOARD,
        requires_auth: true,
        allowed_roles: &[Role::Restricted],
    },
];

/// Dashboard each role lands on after login.
pub fn landing_route(role: Role) -> &'static str {
    match role {
        Role::Manager => MANAGER_DASHBOARD,
        Role::Employee => EMPLOYEE_DASHBOARD,
        Role::Restricted => RESTRICTED_DASHBOARD,
        Role::Guest => LOGIN,
        Role::Unrecognized => {
            warn!("No landing route for unrecognized role, using dashboard");
            DASHBOARD
        }
    }
}

/// Strip trailing slashes and any query or fragment.
pub fn normalize(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or("");
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() { "/" } else { trimmed }
}

pub fn find(path: &str) -> Option<&'static RouteSpec> {
    let path = normalize(path);
    ROUTES.iter().find(|route| route.path == path)
}

/// Paths under the dashboard subtree, including unknown sub-pages.
pub fn is_dashboard_path(path: &str) -> bool {
    let path = normalize(path);
    path == DASHBOARD || path.starts_with("/dashboard/")
}
