//! Durable key/value storage for client-side session data.
//!
//! `Storage` is the raw string store (one value per key). `VersionedStore`
//! layers schema versioning and optional expiry on top of any backend.

mod envelope;
mod file;
mod memory;

pub use envelope::{CURRENT_VERSION, Envelope, VersionedStore};
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// A string key/value store. Implementations synchronize internally.
pub trait Storage: Send + Sync {
    /// Read the raw value for `key`, or `None` if absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write the raw value for `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Errors that can occur while reading or writing storage.
#[derive(Debug)]
pub enum StorageError {
    /// Filesystem error
    Io(std::io::Error),
    /// Key contains characters that cannot be stored
    InvalidKey(String),
    /// Value could not be encoded
    Serialization(serde_json::Error),
    /// Backend lock was poisoned by a panicking writer
    Poisoned,
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "Storage I/O error: {}", e),
            StorageError::InvalidKey(key) => write!(f, "Invalid storage key: {:?}", key),
            StorageError::Serialization(e) => write!(f, "Failed to encode value: {}", e),
            StorageError::Poisoned => write!(f, "Storage lock poisoned"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Serialization(e)
    }
}
