//! Role permission sets loaded from configuration.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use super::types::{Role, UserRecord};

/// On-disk entry: `{"MANAGER": {"permissions": ["..."]}, ...}`.
#[derive(Debug, Default, Deserialize)]
struct PermissionEntry {
    #[serde(default)]
    permissions: BTreeSet<String>,
}

/// Permissions granted to each role. Roles not listed get none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSets {
    sets: HashMap<Role, BTreeSet<String>>,
}

impl PermissionSets {
    pub fn from_json(json: &str) -> Result<Self, PermissionsError> {
        let entries: HashMap<Role, PermissionEntry> =
            serde_json::from_str(json).map_err(PermissionsError::Parse)?;
        Ok(Self {
            sets: entries
                .into_iter()
                .map(|(role, entry)| (role, entry.permissions))
                .collect(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, PermissionsError> {
        let content = std::fs::read_to_string(path).map_err(PermissionsError::Io)?;
        let sets = Self::from_json(&content)?;
        info!(path = %path.display(), roles = sets.sets.len(), "Loaded permission sets");
        Ok(sets)
    }

    pub fn for_role(&self, role: Role) -> BTreeSet<String> {
        self.sets.get(&role).cloned().unwrap_or_default()
    }

    /// The user's own permissions plus those of their role.
    pub fn effective(&self, user: &UserRecord) -> BTreeSet<String> {
        let mut all = self.for_role(user.role);
        all.extend(user.permissions.iter().cloned());
        all
    }
}

#[derive(Debug)]
pub enum PermissionsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for PermissionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PermissionsError::Io(e) => write!(f, "Failed to read permission sets: {}", e),
            PermissionsError::Parse(e) => write!(f, "Invalid permission sets: {}", e),
        }
    }
}

impl std::error::Error for PermissionsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PermissionsError::Io(e) => Some(e),
            PermissionsError::Parse(e) => Some(e),
        }
    }
}
