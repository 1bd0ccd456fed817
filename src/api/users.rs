//! Account endpoints: role upgrade and manager user administration.

use std::collections::BTreeSet;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{ApiClient, ApiError};
use crate::auth::{Role, UserRecord};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpgradeRequest {
    user_account_id: i64,
}

/// Account as returned by the user endpoints.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserAccount {
    user_account_id: i64,
    email: String,
    role: Role,
    #[serde(default)]
    permissions: BTreeSet<String>,
}

impl From<UserAccount> for UserRecord {
    fn from(account: UserAccount) -> Self {
        Self {
            id: account.user_account_id,
            email: account.email,
            role: account.role,
            permissions: account.permissions,
        }
    }
}

impl ApiClient {
    /// Ask for the Employee role on behalf of a restricted account.
    pub async fn request_employee_access(&self, user_id: i64) -> Result<UserRecord, ApiError> {
        let req = self
            .request(Method::POST, "users/upgrade")?
            .json(&UpgradeRequest {
                user_account_id: user_id,
            });
        let account: UserAccount = self
            .send_json(req, "Failed to request employee access")
            .await
            .map_err(|e| {
                e.refine(&[
                    ("RESTRICTED", "Only restricted users can request employee access"),
                    ("already", "You already have employee access or higher"),
                ])
            })?;
        info!(user_id, role = %account.role, "Employee access granted");
        Ok(account.into())
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, ApiError> {
        let req = self.request(Method::GET, "users")?;
        let accounts: Vec<UserAccount> = self.send_json(req, "Failed to fetch users").await?;
        Ok(accounts.into_iter().map(UserRecord::from).collect())
    }

    pub async fn delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, &format!("users/{}", user_id))?;
        self.send_empty(req, "Failed to delete user")
            .await
            .map_err(|e| e.refine(&[("own account", "Cannot delete your own account")]))?;
        info!(user_id, "User deleted");
        Ok(())
    }
}
