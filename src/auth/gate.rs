//! Route guarding against the current session.

use tracing::debug;

use super::routes::{self, DASHBOARD, LOGIN};
use super::state::{SessionPhase, SessionView};
use super::types::Role;

/// Outcome of asking whether a location may be shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Session is still being restored; show nothing yet
    Pending,
    Allow,
    Redirect {
        to: &'static str,
        /// Location the user originally asked for
        from: Option<String>,
    },
}

impl GateDecision {
    fn to_landing(role: Role, requested: &str) -> Self {
        let landing = routes::landing_route(role);
        if landing == routes::normalize(requested) {
            GateDecision::Allow
        } else {
            GateDecision::Redirect {
                to: landing,
                from: None,
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthorizationGate {
    view: SessionView,
}

impl AuthorizationGate {
    pub fn new(view: SessionView) -> Self {
        Self { view }
    }

    /// Decide for a route that does or does not require authentication.
    /// A login redirect carries `requested` untouched, query included.
    pub fn can_enter(&self, requires_auth: bool, requested: &str) -> GateDecision {
        let state = self.view.snapshot();

        match (state.phase(), requires_auth) {
            (SessionPhase::Restoring, _) => GateDecision::Pending,
            (SessionPhase::Unauthenticated, true) => {
                debug!(requested = %requested, "Not authenticated, redirecting to login");
                GateDecision::Redirect {
                    to: LOGIN,
                    from: Some(requested.to_string()),
                }
            }
            (SessionPhase::Authenticated, false) => match state.role() {
                Some(role) => GateDecision::to_landing(role, requested),
                None => GateDecision::Allow,
            },
            _ => GateDecision::Allow,
        }
    }

    /// Decide for an arbitrary application path using the route table.
    pub fn navigate(&self, requested: &str) -> GateDecision {
        let path = routes::normalize(requested);

        if let Some(route) = routes::find(path) {
            let decision = self.can_enter(route.requires_auth, requested);
            if decision != GateDecision::Allow || !route.requires_auth {
                return decision;
            }
            let Some(role) = self.view.role() else {
                return decision;
            };
            if route.path == DASHBOARD || !route.allows(role) {
                return GateDecision::to_landing(role, route.path);
            }
            return GateDecision::Allow;
        }

        if routes::is_dashboard_path(path) {
            return match self.can_enter(true, requested) {
                GateDecision::Allow => match self.view.role() {
                    Some(role) => GateDecision::to_landing(role, path),
                    None => GateDecision::Allow,
                },
                other => other,
            };
        }

        // Everything else falls through to the login page.
        match self.navigate(LOGIN) {
            GateDecision::Allow => GateDecision::Redirect {
                to: LOGIN,
                from: None,
            },
            other => other,
        }
    }

    /// Where to go once signed in: `from` if it would be allowed, otherwise
    /// the role's landing route.
    pub fn after_login(&self, from: Option<&str>) -> String {
        if let Some(from) = from.filter(|from| self.navigate(from) == GateDecision::Allow) {
            return from.to_string();
        }

        match self.view.role() {
            Some(role) => routes::landing_route(role).to_string(),
            None => LOGIN.to_string(),
        }
    }
}
