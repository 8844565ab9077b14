// Key-value storage for persisted state.
// One JSON blob per key, with file and in-memory backends and a lifecycle guard.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::StorageError;
use crate::lifecycle::Lifecycle;

use super::paths::key_path;

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Persisted key-value store. Every call may fail, including after teardown.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> StorageResult<()>;

    /// Remove several keys in one operation.
    fn remove(&self, keys: &[&str]) -> StorageResult<()>;

    /// Whether the backing runtime can still be reached.
    fn is_available(&self) -> bool {
        true
    }
}

/// Read a key and decode it. Absent keys yield `None`.
pub fn read_json<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> StorageResult<Option<T>> {
    match storage.get(key)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Encode a value and write it under a key.
pub fn write_json<T: Serialize>(storage: &dyn Storage, key: &str, data: &T) -> StorageResult<()> {
    storage.set(key, serde_json::to_value(data)?)
}

/// Storage backed by a directory, one `<key>.json` file per key.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        let path = key_path(&self.dir, key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&contents)?))
    }

    fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        fs::create_dir_all(&self.dir)?;

        let path = key_path(&self.dir, key);
        let json = serde_json::to_string_pretty(&value)?;

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> StorageResult<()> {
        for key in keys {
            let path = key_path(&self.dir, key);
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        !self.dir.exists() || self.dir.is_dir()
    }
}

/// In-process storage. `invalidate` simulates the owning runtime going away.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, Value>>,
    invalidated: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalidate(&self) {
        self.invalidated.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> StorageResult<()> {
        if self.invalidated.load(Ordering::SeqCst) {
            Err(StorageError::ContextInvalidated)
        } else {
            Ok(())
        }
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        self.check()?;
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        self.check()?;
        self.entries.lock().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, keys: &[&str]) -> StorageResult<()> {
        self.check()?;
        let mut entries = self.entries.lock();
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        !self.invalidated.load(Ordering::SeqCst)
    }
}

/// Storage wrapper that refuses all access once the lifecycle is torn down
/// or the backend reports itself unavailable.
#[derive(Clone)]
pub struct GuardedStorage {
    inner: Arc<dyn Storage>,
    lifecycle: Lifecycle,
}

impl GuardedStorage {
    pub fn new(inner: Arc<dyn Storage>, lifecycle: Lifecycle) -> Self {
        Self { inner, lifecycle }
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    fn guard(&self) -> StorageResult<()> {
        if self.lifecycle.is_alive() && self.inner.is_available() {
            Ok(())
        } else {
            Err(StorageError::ContextInvalidated)
        }
    }
}

impl Storage for GuardedStorage {
    fn get(&self, key: &str) -> StorageResult<Option<Value>> {
        self.guard()?;
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: Value) -> StorageResult<()> {
        self.guard()?;
        self.inner.set(key, value)
    }

    fn remove(&self, keys: &[&str]) -> StorageResult<()> {
        self.guard()?;
        self.inner.remove(keys)
    }

    fn is_available(&self) -> bool {
        self.guard().is_ok()
    }
}
