//! HTTP client for the reimbursement backend.
//!
//! One [`ApiClient`] is shared by the session controller and every caller.
//! Clones share the bound credential, so binding it once after login makes
//! every later request carry `Authorization: Bearer <credential>`.

mod auth;
mod error;
mod reimbursements;
mod users;

use std::sync::{Arc, RwLock};

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::auth::Credential;

pub use auth::AuthGrant;
pub use error::{ApiError, NETWORK_ERROR_MESSAGE};
pub use reimbursements::{
    NewReimbursement, Reimbursement, ReimbursementStatus, ReimbursementType, Resolution,
};

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    http: Client,
    bearer: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Client rooted at `base`. Endpoint paths are joined relative to it.
    pub fn new(base: Url) -> Self {
        Self::with_client(base, Client::new())
    }

    pub fn with_client(mut base: Url, http: Client) -> Self {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Self {
            base,
            http,
            bearer: Arc::new(RwLock::new(None)),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Bind or clear the credential attached to outgoing requests.
    pub fn set_credential(&self, credential: Option<&Credential>) {
        let mut bearer = self.bearer.write().unwrap_or_else(|e| e.into_inner());
        *bearer = credential.map(Credential::bearer_header);
        if bearer.is_some() {
            debug!("Credential bound to API client");
        } else {
            debug!("Credential cleared from API client");
        }
    }

    /// Current `Authorization` header value, if a credential is bound.
    pub fn authorization(&self) -> Option<String> {
        self.bearer
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base.join(path).map_err(ApiError::InvalidUrl)
    }

    /// Request builder for `path` carrying the bound credential.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let builder = self.http.request(method, self.endpoint(path)?);
        Ok(match self.authorization() {
            Some(value) => builder.header(reqwest::header::AUTHORIZATION, value),
            None => builder,
        })
    }

    /// Request builder for `path` that ignores the bound credential.
    pub(crate) fn anonymous(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.http.request(method, self.endpoint(path)?))
    }

    /// Send and decode a JSON body. `fallback` is the message used when the
    /// backend rejects the call without one.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let resp = self.send(req, fallback).await?;
        resp.json::<T>().await.map_err(|e| {
            warn!(error = %e, "Invalid JSON response");
            ApiError::InvalidResponse(e.to_string())
        })
    }

    /// Send and discard the response body.
    pub async fn send_empty(&self, req: RequestBuilder, fallback: &str) -> Result<(), ApiError> {
        self.send(req, fallback).await.map(|_| ())
    }

    async fn send(
        &self,
        req: RequestBuilder,
        fallback: &str,
    ) -> Result<reqwest::Response, ApiError> {
        let resp = req.send().await.map_err(|e| {
            warn!(error = %e, "Request failed");
            ApiError::Network
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message =
            error::backend_message(&body).unwrap_or_else(|| fallback.to_string());
        debug!(status = status.as_u16(), message = %message, "Request rejected");
        Err(ApiError::rejected(status.as_u16(), message))
    }
}
