//! Navigation menu entries filtered by role.

use super::routes::DASHBOARD;
use super::state::SessionView;
use super::types::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub label: &'static str,
    pub path: &'static str,
    pub roles: &'static [Role],
}

pub const NAV_ITEMS: &[NavItem] = &[NavItem {
    label: "Dashboard",
    path: DASHBOARD,
    roles: &[Role::Manager, Role::Employee, Role::Restricted],
}];

/// Items the current session may see. Empty when signed out.
pub fn visible_items(view: &SessionView) -> Vec<&'static NavItem> {
    match view.role() {
        Some(role) => items_for_role(role),
        None => Vec::new(),
    }
}

pub fn items_for_role(role: Role) -> Vec<&'static NavItem> {
    NAV_ITEMS
        .iter()
        .filter(|item| item.roles.contains(&role))
        .collect()
}
