//! Product repository
//!
//! The effective product catalog: the base product list merged with the
//! locally persisted overlay of upserts and tombstones.

use std::sync::{Arc, RwLock};

use serde_json::Value;

use crate::error::{GstBillError, GstBillResult};
use crate::models::Product;

use super::base::{fetch_or_empty, BaseSource};
use super::kv::KeyValueStore;
use super::overlay::{CollectionOverlay, OverlayState};

/// Overlay key, shared with datasets edited by the web front end
pub const PRODUCTS_OVERLAY_KEY: &str = "listofprodutes_overrides";

/// Repository for the product catalog
pub struct ProductRepository {
    base: RwLock<Vec<Product>>,
    overlay: CollectionOverlay<Product>,
}

impl ProductRepository {
    /// Create a new product repository persisting through `port`
    pub fn new(port: Arc<dyn KeyValueStore>) -> Self {
        Self {
            base: RwLock::new(Vec::new()),
            overlay: CollectionOverlay::new(PRODUCTS_OVERLAY_KEY, port),
        }
    }

    /// Fetch the base list and read the persisted overlay
    ///
    /// A missing or unusable base yields an empty base; the overlay alone
    /// then determines the catalog.
    pub fn load(&self, source: &dyn BaseSource) -> GstBillResult<()> {
        let base = fetch_or_empty("products", || source.fetch_products())
            .map(|raw| parse_base(&raw))
            .unwrap_or_default();

        tracing::debug!(count = base.len(), "loaded base products");
        *self.base.write().map_err(|e| {
            GstBillError::Storage(format!("Failed to acquire write lock: {}", e))
        })? = base;

        self.overlay.load()
    }

    /// The merged catalog, base order first
    pub fn list(&self) -> GstBillResult<Vec<Product>> {
        let base = self.base.read().map_err(|e| {
            GstBillError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        self.overlay.merge(&base)
    }

    /// Get a product by id from the merged catalog
    pub fn get(&self, id: &str) -> GstBillResult<Option<Product>> {
        Ok(self.list()?.into_iter().find(|p| p.id == id))
    }

    /// The unmodified base list
    pub fn base(&self) -> GstBillResult<Vec<Product>> {
        let base = self.base.read().map_err(|e| {
            GstBillError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(base.clone())
    }

    /// The current overlay
    pub fn overrides(&self) -> GstBillResult<OverlayState<Product>> {
        self.overlay.snapshot()
    }

    /// Check whether an id has a local upsert or tombstone
    pub fn is_overridden(&self, id: &str) -> GstBillResult<bool> {
        let overlay = self.overlay.snapshot()?;
        Ok(overlay.upsert_for(id).is_some() || overlay.is_deleted(id))
    }

    /// Insert or update a product
    pub fn upsert(&self, product: Product) -> GstBillResult<()> {
        tracing::debug!(id = %product.id, "upserting product");
        self.overlay.upsert(product)
    }

    /// Tombstone a product
    pub fn delete(&self, id: &str) -> GstBillResult<()> {
        tracing::debug!(id, "tombstoning product");
        self.overlay.remove(id)
    }

    /// Discard all local product edits
    pub fn clear_overrides(&self) -> GstBillResult<()> {
        self.overlay.clear()
    }

    /// Count products in the merged catalog
    pub fn count(&self) -> GstBillResult<usize> {
        Ok(self.list()?.len())
    }
}

fn parse_base(raw: &Value) -> Vec<Product> {
    let Some(records) = raw.as_array() else {
        tracing::warn!("base products are not a JSON array, using empty base");
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| {
            let product = Product::from_raw(record);
            if product.is_none() {
                tracing::warn!(%record, "skipping base product without an id");
            }
            product
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use crate::storage::base::StaticSource;
    use crate::storage::kv::MemoryKvStore;
    use serde_json::json;

    fn source() -> StaticSource {
        StaticSource {
            products: Some(json!([
                {"id": "t1", "name": "Masala Tea", "price": 120, "category": "Tea"},
                {"id": "t2", "name": "Black Tea", "price": 90.5},
                {"name": "Orphan"}
            ])),
            ..Default::default()
        }
    }

    fn create_test_repo() -> (Arc<dyn KeyValueStore>, ProductRepository) {
        let port: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let repo = ProductRepository::new(port.clone());
        repo.load(&source()).unwrap();
        (port, repo)
    }

    #[test]
    fn test_load_base() {
        let (_port, repo) = create_test_repo();
        let products = repo.list().unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].price, Money::from_rupees(90.5));
        assert_eq!(repo.base().unwrap(), products);
    }

    #[test]
    fn test_missing_base_is_empty() {
        let port: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let repo = ProductRepository::new(port);
        repo.load(&StaticSource::default()).unwrap();
        assert_eq!(repo.count().unwrap(), 0);

        repo.upsert(Product::with_id("local", "Local", Money::zero()))
            .unwrap();
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_non_array_base_is_empty() {
        let port: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let repo = ProductRepository::new(port);
        repo.load(&StaticSource {
            products: Some(json!({"id": "t1"})),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_writes_are_immediately_visible() {
        let (_port, repo) = create_test_repo();

        let updated = Product::with_id("t1", "Masala Tea", Money::from_rupees(130.0));
        repo.upsert(updated.clone()).unwrap();
        assert_eq!(repo.get("t1").unwrap(), Some(updated));

        repo.delete("t2").unwrap();
        assert!(repo.get("t2").unwrap().is_none());
        assert!(repo.is_overridden("t2").unwrap());

        // Base is untouched
        assert_eq!(repo.base().unwrap().len(), 2);
    }

    #[test]
    fn test_overlay_survives_reload() {
        let (port, repo) = create_test_repo();
        repo.upsert(Product::with_id("t3", "Green Tea", Money::from_rupees(75.0)))
            .unwrap();
        repo.delete("t1").unwrap();

        let reopened = ProductRepository::new(port);
        reopened.load(&source()).unwrap();
        let ids: Vec<_> = reopened.list().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["t2", "t3"]);
    }

    #[test]
    fn test_clear_overrides_restores_base() {
        let (_port, repo) = create_test_repo();
        repo.delete("t1").unwrap();
        repo.upsert(Product::with_id("t9", "Extra", Money::zero()))
            .unwrap();

        repo.clear_overrides().unwrap();
        assert_eq!(repo.list().unwrap(), repo.base().unwrap());
        assert!(!repo.is_overridden("t1").unwrap());
    }
}
