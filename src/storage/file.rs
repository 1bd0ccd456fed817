use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use super::{Storage, StorageError};

/// Directory-backed storage. Each key is stored as `<dir>/<key>.json`.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Use `dir` as the storage root. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

/// Keys become file names, so only a conservative character set is allowed.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        std::fs::create_dir_all(&self.dir)?;

        // Write then rename so readers never observe a half-written value.
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4()));
        if let Err(e) = std::fs::write(&tmp, value) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock().map_err(|_| StorageError::Poisoned)?;

        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
