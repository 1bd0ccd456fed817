//! Durable storage of the credential and user record.

use tracing::{debug, error};

use super::types::{Credential, UserRecord};
use crate::jwt;
use crate::storage::VersionedStore;

/// Storage key for the bearer credential.
pub const TOKEN_KEY: &str = "authToken";

/// Storage key for the user record.
pub const USER_KEY: &str = "authUser";

/// Persists the session pair under two independent envelopes.
///
/// Write failures are logged and swallowed: a session that could not be
/// saved simply will not be restored next time.
#[derive(Clone)]
pub struct TokenStore {
    store: VersionedStore,
}

impl TokenStore {
    pub fn new(store: VersionedStore) -> Self {
        Self { store }
    }

    /// Persist both halves of a session. Envelopes expire with the credential.
    pub fn persist(&self, credential: &Credential, user: &UserRecord) {
        let expiry = jwt::expiry_millis(credential);

        if let Err(e) = self.store.set_until(TOKEN_KEY, credential, expiry) {
            error!(error = %e, "Failed to store credential");
        }
        if let Err(e) = self.store.set_until(USER_KEY, user, expiry) {
            error!(error = %e, "Failed to store user");
        }
        debug!(
            user_id = user.id,
            expiry = ?expiry,
            "Session data stored"
        );
    }

    /// Rewrite only the user envelope, keeping the credential's expiry.
    pub fn persist_user(&self, credential: &Credential, user: &UserRecord) {
        let expiry = jwt::expiry_millis(credential);
        if let Err(e) = self.store.set_until(USER_KEY, user, expiry) {
            error!(error = %e, "Failed to store user");
        }
    }

    pub fn read_credential(&self) -> Option<Credential> {
        self.store.get(TOKEN_KEY)
    }

    pub fn read_user(&self) -> Option<UserRecord> {
        self.store.get(USER_KEY)
    }

    /// Remove both envelopes. Safe to call when nothing is stored.
    pub fn clear(&self) {
        debug!("Clearing session data");
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_KEY);
    }
}
