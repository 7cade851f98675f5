//! Storage layer for gstbill
//!
//! Base datasets come from a [`BaseSource`]; local edits are kept as
//! overlays behind a [`KeyValueStore`] port and merged on every read.

pub mod base;
pub mod details;
pub mod draft;
pub mod file_io;
pub mod kv;
pub mod overlay;
pub mod products;

pub use base::{BaseSource, JsonFileSource, StaticSource};
pub use details::{BankRepository, CompanyRepository};
pub use draft::DraftRepository;
pub use file_io::{read_json, write_json_atomic};
pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use overlay::{merge, OverlayState};
pub use products::ProductRepository;

use std::sync::Arc;

use crate::config::paths::GstBillPaths;
use crate::error::GstBillError;

/// Main storage coordinator that provides access to all repositories
///
/// Constructed once per session; every repository shares the same
/// persistence port.
pub struct Storage {
    paths: GstBillPaths,
    pub products: ProductRepository,
    pub bank: BankRepository,
    pub company: CompanyRepository,
    pub draft: DraftRepository,
}

impl Storage {
    /// Create a new Storage instance backed by files under the data directory
    pub fn new(paths: GstBillPaths) -> Result<Self, GstBillError> {
        paths.ensure_directories()?;
        let port: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(paths.data_dir()));
        Ok(Self::with_port(paths, port))
    }

    /// Create a Storage instance over an arbitrary persistence port
    pub fn with_port(paths: GstBillPaths, port: Arc<dyn KeyValueStore>) -> Self {
        Self {
            products: ProductRepository::new(port.clone()),
            bank: BankRepository::new(port.clone()),
            company: CompanyRepository::new(port),
            draft: DraftRepository::new(paths.draft_file()),
            paths,
        }
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &GstBillPaths {
        &self.paths
    }

    /// Fetch every base dataset and read every overlay
    pub fn load_all(&self, source: &dyn BaseSource) -> Result<(), GstBillError> {
        self.products.load(source)?;
        self.bank.load(source)?;
        self.company.load(source)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GstBillPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.draft.exists());
    }

    #[test]
    fn test_load_all_and_persist_overlay_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GstBillPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let source = StaticSource {
            products: Some(json!([{"id": "t1", "name": "Tea", "price": 10}])),
            bank: Some(json!({"bankName": "SBI"})),
            company: None,
        };
        storage.load_all(&source).unwrap();

        assert_eq!(storage.products.count().unwrap(), 1);
        assert_eq!(storage.bank.get().unwrap().bank_name.as_deref(), Some("SBI"));
        assert!(storage.company.get().unwrap().is_empty());

        storage.products.delete("t1").unwrap();
        assert!(temp_dir
            .path()
            .join("data")
            .join("listofprodutes_overrides.json")
            .exists());
    }
}
