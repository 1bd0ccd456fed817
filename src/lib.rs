pub mod api;
pub mod auth;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod jwt;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use api::ApiClient;
use auth::{AuthorizationGate, PermissionSets, SessionController, TokenStore};
use clock::{Clock, SystemClock};
use jwt::SessionValidator;
use storage::{FileStorage, Storage, VersionedStore};
use url::Url;

pub struct ClientConfig {
    /// Backend API root (e.g., "http://localhost:8080/api")
    pub api_base_url: Url,
    /// Directory holding the persisted session
    pub storage_dir: PathBuf,
    /// Permissions granted per role
    pub permissions: PermissionSets,
}

/// Everything a front end needs to drive one session.
pub struct Session {
    pub controller: SessionController,
    pub gate: AuthorizationGate,
    pub permissions: PermissionSets,
}

impl Session {
    pub fn api(&self) -> &ApiClient {
        self.controller.api()
    }
}

/// Create a session persisted under the configured storage directory.
/// The session starts out restoring; call `controller.restore()` next.
pub fn create_session(config: ClientConfig) -> Session {
    let backend = Arc::new(FileStorage::new(config.storage_dir));
    create_session_with(
        config.api_base_url,
        config.permissions,
        backend,
        Arc::new(SystemClock),
    )
}

/// Create a session over an arbitrary storage backend and clock.
pub fn create_session_with(
    api_base_url: Url,
    permissions: PermissionSets,
    backend: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
) -> Session {
    let store = TokenStore::new(VersionedStore::new(backend, clock.clone()));
    let api = ApiClient::new(api_base_url);
    let controller = SessionController::new(store, SessionValidator::new(clock), api);
    let gate = AuthorizationGate::new(controller.view());

    Session {
        controller,
        gate,
        permissions,
    }
}
