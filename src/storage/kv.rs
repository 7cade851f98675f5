//! Key-value persistence port
//!
//! The overlay engine only needs `read`, `write` and `delete` on string
//! values. `FileKvStore` keeps one file per key under the data directory;
//! `MemoryKvStore` backs tests and embedders that persist elsewhere.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{GstBillError, GstBillResult};

use super::file_io::{remove_if_exists, write_bytes_atomic};

/// Minimal durable key-value contract
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn read(&self, key: &str) -> GstBillResult<Option<String>>;

    /// Replace the value stored under `key`
    fn write(&self, key: &str, value: &str) -> GstBillResult<()>;

    /// Remove `key`; removing a missing key succeeds
    fn delete(&self, key: &str) -> GstBillResult<()>;
}

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> GstBillResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(GstBillError::Validation(format!(
                "Invalid storage key: {:?}",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileKvStore {
    fn read(&self, key: &str) -> GstBillResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GstBillError::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn write(&self, key: &str, value: &str) -> GstBillResult<()> {
        let path = self.path_for(key)?;
        write_bytes_atomic(path, value.as_bytes())
    }

    fn delete(&self, key: &str) -> GstBillResult<()> {
        let path = self.path_for(key)?;
        remove_if_exists(path)
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    data: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn read(&self, key: &str) -> GstBillResult<Option<String>> {
        let data = self.data.read().map_err(|e| {
            GstBillError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(data.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> GstBillResult<()> {
        let mut data = self.data.write().map_err(|e| {
            GstBillError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> GstBillResult<()> {
        let mut data = self.data.write().map_err(|e| {
            GstBillError::Storage(format!("Failed to acquire write lock: {}", e))
        })?;
        data.remove(key);
        Ok(())
    }
}
