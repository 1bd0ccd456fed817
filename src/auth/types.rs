//! Session data types shared by the store, controller, and gate.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Bearer token issued by the backend.
///
/// Opaque to the client apart from its expiry claim. `Debug` never prints
/// the token itself.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header.
    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(<{} bytes>)", self.0.len())
    }
}

/// User role for authorization.
///
/// The backend sends upper-case names; lower-case names are accepted too.
/// Any other name deserializes as `Unrecognized` so that an unexpected
/// backend role degrades instead of failing the whole session. The original
/// name is not kept: `Unrecognized` is written back as `"UNRECOGNIZED"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[serde(alias = "manager")]
    Manager,
    #[serde(alias = "employee")]
    Employee,
    #[serde(alias = "restricted")]
    Restricted,
    #[serde(alias = "guest")]
    Guest,
    #[serde(other)]
    Unrecognized,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Manager => "MANAGER",
            Role::Employee => "EMPLOYEE",
            Role::Restricted => "RESTRICTED",
            Role::Guest => "GUEST",
            Role::Unrecognized => "UNRECOGNIZED",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// The signed-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "userId")]
    pub id: i64,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
}

impl UserRecord {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        let role: Role = serde_json::from_str("\"MANAGER\"").unwrap();
        assert_eq!(role, Role::Manager);

        let role: Role = serde_json::from_str("\"restricted\"").unwrap();
        assert_eq!(role, Role::Restricted);

        let role: Role = serde_json::from_str("\"SUPERVISOR\"").unwrap();
        assert_eq!(role, Role::Unrecognized);

        assert_eq!(serde_json::to_string(&Role::Employee).unwrap(), "\"EMPLOYEE\"");
    }

    #[test]
    fn test_unrecognized_role_survives_storage() {
        let user: UserRecord = serde_json::from_str(
            r#"{"userId":3,"email":"s@b.com","role":"SUPERVISOR"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Unrecognized);

        let stored = serde_json::to_string(&user).unwrap();
        assert!(stored.contains("\"UNRECOGNIZED\""));
        assert!(!stored.contains("SUPERVISOR"));

        let restored: UserRecord = serde_json::from_str(&stored).unwrap();
        assert_eq!(restored, user);
    }

    #[test]
    fn test_user_record_json_shape() {
        let user: UserRecord = serde_json::from_str(
            r#"{"userId":7,"email":"a@b.com","role":"EMPLOYEE","permissions":["LOGOUT"]}"#,
        )
        .unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.role, Role::Employee);
        assert!(user.has_permission("LOGOUT"));

        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["userId"], 7);
        assert_eq!(json["role"], "EMPLOYEE");
    }

    #[test]
    fn test_permissions_default_to_empty() {
        let user: UserRecord =
            serde_json::from_str(r#"{"userId":1,"email":"g@b.com","role":"GUEST"}"#).unwrap();
        assert!(user.permissions.is_empty());
    }

    #[test]
    fn test_credential_debug_hides_token() {
        let credential = Credential::new("secret.token.value");
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("secret"));
        assert_eq!(credential.bearer_header(), "Bearer secret.token.value");
    }
}
