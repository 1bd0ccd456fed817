//! Client-side authentication session.
//!
//! [`SessionController`] owns the credential and user record, persists them
//! through [`TokenStore`], and binds the credential to the shared
//! [`ApiClient`](crate::api::ApiClient). Everything else observes the
//! session through a read-only [`SessionView`] and guards navigation with
//! an [`AuthorizationGate`].

mod controller;
mod errors;
mod gate;
mod nav;
mod permissions;
pub mod routes;
mod state;
mod token_store;
mod types;

pub use controller::SessionController;
pub use errors::SessionError;
pub use gate::{AuthorizationGate, GateDecision};
pub use nav::{NAV_ITEMS, NavItem, items_for_role, visible_items};
pub use permissions::{PermissionSets, PermissionsError};
pub use routes::landing_route;
pub use state::{SessionPhase, SessionState, SessionView};
pub use token_store::{TOKEN_KEY, TokenStore, USER_KEY};
pub use types::{Credential, Role, UserRecord};
