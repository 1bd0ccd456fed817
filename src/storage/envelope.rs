//! Versioned, optionally expiring values on top of a raw `Storage`.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use super::{Storage, StorageError};
use crate::clock::Clock;

/// Schema version written by this build.
pub const CURRENT_VERSION: u32 = 1;

/// On-disk wrapper around a stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub value: T,
    pub version: u32,
    /// Absolute expiry in Unix milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u64>,
}

/// Envelope as read back, before the value is trusted.
#[derive(Deserialize)]
struct RawEnvelope {
    value: serde_json::Value,
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    expiry: Option<u64>,
}

/// Typed access to a `Storage` backend with version and expiry checks.
///
/// A stored envelope is only returned when its version equals this store's
/// version, its expiry (if any) has not passed, and its value decodes as the
/// requested type. Anything else is removed on read.
#[derive(Clone)]
pub struct VersionedStore {
    backend: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    version: u32,
}

impl VersionedStore {
    pub fn new(backend: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self::with_version(backend, clock, CURRENT_VERSION)
    }

    /// Store that reads and writes a specific schema version.
    pub fn with_version(backend: Arc<dyn Storage>, clock: Arc<dyn Clock>, version: u32) -> Self {
        Self {
            backend,
            clock,
            version,
        }
    }

    /// Write `value` under `key`, expiring `ttl` from now if given.
    pub fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        let expiry = ttl.map(|ttl| self.clock.now_millis().saturating_add(ttl.as_millis() as u64));
        self.set_until(key, value, expiry)
    }

    /// Write `value` under `key` with an absolute expiry in Unix milliseconds.
    pub fn set_until<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        expiry: Option<u64>,
    ) -> Result<(), StorageError> {
        let envelope = Envelope {
            value,
            version: self.version,
            expiry,
        };
        let raw = serde_json::to_string(&envelope)?;
        self.backend.set_item(key, &raw)?;
        debug!(key = %key, expiry = ?expiry, "Stored value");
        Ok(())
    }

    /// Read the value under `key`. Stale, foreign-version, or undecodable
    /// envelopes are evicted and read as absent. Backend errors are logged
    /// and read as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read stored value");
                return None;
            }
        };

        let envelope: RawEnvelope = match serde_json::from_str(&raw) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(key = %key, error = %e, "Stored value is not an envelope, clearing");
                self.remove(key);
                return None;
            }
        };

        if envelope.version != Some(self.version) {
            debug!(
                key = %key,
                found = ?envelope.version,
                expected = self.version,
                "Version mismatch, clearing"
            );
            self.remove(key);
            return None;
        }

        if let Some(expiry) = envelope.expiry {
            if expiry < self.clock.now_millis() {
                debug!(key = %key, expiry, "Stored value expired, clearing");
                self.remove(key);
                return None;
            }
        }

        match serde_json::from_value(envelope.value) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key = %key, error = %e, "Stored value has unexpected shape, clearing");
                self.remove(key);
                None
            }
        }
    }

    /// Remove `key`. Errors are logged, not returned.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove_item(key) {
            warn!(key = %key, error = %e, "Failed to remove stored value");
        }
    }
}
