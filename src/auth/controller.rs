//! The single writer of session state.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::errors::SessionError;
use super::state::{SessionState, SessionView};
use super::token_store::TokenStore;
use super::types::{Credential, Role, UserRecord};
use crate::api::ApiClient;
use crate::jwt::SessionValidator;

/// Owns the session state and keeps storage and the API binding in step
/// with it. Readers get a [`SessionView`].
pub struct SessionController {
    store: TokenStore,
    validator: SessionValidator,
    api: ApiClient,
    state: watch::Sender<SessionState>,
    restored: bool,
}

impl SessionController {
    pub fn new(store: TokenStore, validator: SessionValidator, api: ApiClient) -> Self {
        let (state, _) = watch::channel(SessionState::restoring());
        Self {
            store,
            validator,
            api,
            state,
            restored: false,
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView::new(self.state.subscribe())
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Load the persisted session. Only the first call has any effect.
    pub fn restore(&mut self) {
        if self.restored {
            debug!("Session already restored, ignoring");
            return;
        }
        self.restored = true;

        let credential = self.store.read_credential();
        let user = self.store.read_user();

        match (credential, user) {
            (Some(credential), Some(user)) if self.validator.is_valid(&credential) => {
                info!(user_id = user.id, role = %user.role, "Session restored");
                self.api.set_credential(Some(&credential));
                self.state.send_replace(SessionState {
                    credential: Some(credential),
                    user: Some(user),
                    is_restoring: false,
                });
            }
            (credential, user) => {
                if credential.is_some() || user.is_some() {
                    info!("Stored session is incomplete or expired, clearing");
                }
                self.store.clear();
                self.api.set_credential(None);
                self.state.send_replace(SessionState::signed_out());
            }
        }
    }

    /// Install a new session. Replaces whatever was there before.
    pub fn login(&mut self, credential: Credential, user: UserRecord) {
        self.restored = true;
        self.store.persist(&credential, &user);
        self.api.set_credential(Some(&credential));
        info!(user_id = user.id, role = %user.role, "Logged in");
        self.state.send_replace(SessionState {
            credential: Some(credential),
            user: Some(user),
            is_restoring: false,
        });
    }

    /// Replace the user record of the current session. Returns `false` and
    /// changes nothing when no credential is held.
    pub fn update_user(&mut self, user: UserRecord) -> bool {
        let Some(credential) = self.state.borrow().credential.clone() else {
            warn!("Cannot update user without an active session");
            return false;
        };

        self.store.persist_user(&credential, &user);
        info!(user_id = user.id, role = %user.role, "User updated");
        self.state.send_modify(|state| state.user = Some(user));
        true
    }

    /// End the session locally, then tell the backend in the background.
    ///
    /// The returned handle belongs to the remote call. Dropping it does not
    /// cancel the call.
    pub fn logout(&mut self) -> Option<JoinHandle<()>> {
        self.restored = true;
        let previous = self.state.send_replace(SessionState::signed_out());
        self.store.clear();
        self.api.set_credential(None);

        let credential = previous.credential?;
        info!("Logged out");

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                debug!("No async runtime, skipping remote logout");
                return None;
            }
        };

        let api = self.api.clone();
        Some(handle.spawn(async move {
            match api.logout(&credential).await {
                Ok(()) => debug!("Remote logout completed"),
                Err(e) => warn!(error = %e, "Remote logout failed"),
            }
        }))
    }

    /// Authenticate with the backend and install the resulting session.
    pub async fn sign_in(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, SessionError> {
        let grant = self.api.login(email, password).await?;
        self.login(grant.credential, grant.user.clone());
        Ok(grant.user)
    }

    /// Create an account and sign in to it.
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
    ) -> Result<UserRecord, SessionError> {
        let grant = self.api.register(email, password).await?;
        self.login(grant.credential, grant.user.clone());
        Ok(grant.user)
    }

    /// Upgrade a restricted user to employee.
    pub async fn request_upgrade(&mut self) -> Result<UserRecord, SessionError> {
        let current = self.state();
        let user = match (current.is_authenticated(), current.user) {
            (true, Some(user)) => user,
            _ => return Err(SessionError::NotLoggedIn),
        };
        if user.role != Role::Restricted {
            return Err(SessionError::RoleNotEligible);
        }

        let upgraded = self.api.request_employee_access(user.id).await?;
        self.update_user(upgraded.clone());
        Ok(upgraded)
    }
}
