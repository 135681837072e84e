use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::error::StorageError;

/// String key/value persistence, the local-storage equivalent for the
/// dashboard stores.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One file per key under a data directory.
///
/// Every key has a sibling `.lock` file. Readers take a shared lock and
/// writers an exclusive one, so other processes sharing the directory see
/// either the old value or the new one. Writes land in a unique temp file
/// that is renamed over the target.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| StorageError::Io {
            key: root.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { root })
    }

    fn file_stem(key: &str) -> String {
        key.chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", Self::file_stem(key)))
    }

    /// Opens the key's lock file and blocks until the lock is held. The
    /// lock is released when the returned handle is dropped.
    fn lock(&self, key: &str, exclusive: bool) -> Result<File, StorageError> {
        let path = self.root.join(format!("{}.lock", Self::file_stem(key)));
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|e| io_error(key, e))?;

        let locked = if exclusive { file.lock_exclusive() } else { file.lock_shared() };
        locked.map_err(|e| io_error(key, e))?;
        Ok(file)
    }
}

fn io_error(key: &str, e: std::io::Error) -> StorageError {
    StorageError::Io { key: key.to_string(), message: e.to_string() }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _lock = self.lock(key, false)?;
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _lock = self.lock(key, true)?;

        let mut tmp = NamedTempFile::new_in(&self.root).map_err(|e| io_error(key, e))?;
        tmp.write_all(value.as_bytes()).map_err(|e| io_error(key, e))?;
        tmp.as_file().sync_all().map_err(|e| io_error(key, e))?;
        tmp.persist(self.path_for(key)).map_err(|e| io_error(key, e.error))?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _lock = self.lock(key, true)?;
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

/// Process-local store, lost on exit.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}
