//! Login, registration and logout endpoints.

use std::collections::BTreeSet;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ApiClient, ApiError};
use crate::auth::{Credential, Role, UserRecord};

const PASSWORD_RULES: &str =
    "Password must contain uppercase, lowercase, number, and special character (8+ chars)";

#[derive(Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    user_id: i64,
    email: String,
    role: Role,
    #[serde(default)]
    permissions: BTreeSet<String>,
}

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub credential: Credential,
    pub user: UserRecord,
}

impl From<AuthResponse> for AuthGrant {
    fn from(resp: AuthResponse) -> Self {
        Self {
            credential: Credential::new(resp.token),
            user: UserRecord {
                id: resp.user_id,
                email: resp.email,
                role: resp.role,
                permissions: resp.permissions,
            },
        }
    }
}

impl ApiClient {
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthGrant, ApiError> {
        debug!(email = %email, "Attempting login");
        let req = self
            .anonymous(Method::POST, "auth/login")?
            .json(&CredentialsRequest { email, password });
        let resp: AuthResponse = self.send_json(req, "Invalid credentials").await?;
        info!(user_id = resp.user_id, "Login accepted");
        Ok(resp.into())
    }

    /// Register a new account. New accounts start out restricted.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthGrant, ApiError> {
        debug!(email = %email, "Attempting registration");
        let req = self
            .anonymous(Method::POST, "auth/register")?
            .json(&CredentialsRequest { email, password });
        let resp: AuthResponse = self
            .send_json(req, "Registration failed")
            .await
            .map_err(|e| {
                e.refine(&[
                    ("email", "This email is already registered"),
                    ("password", PASSWORD_RULES),
                ])
            })?;
        info!(user_id = resp.user_id, "Registration accepted");
        Ok(resp.into())
    }

    /// Invalidate `credential` on the backend. Independent of the bound
    /// credential, which is usually already cleared by the time this runs.
    pub async fn logout(&self, credential: &Credential) -> Result<(), ApiError> {
        let req = self
            .anonymous(Method::POST, "auth/logout")?
            .header(reqwest::header::AUTHORIZATION, credential.bearer_header())
            .json(&serde_json::json!({}));
        self.send_empty(req, "Logout failed").await
    }
}
