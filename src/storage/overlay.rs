//! Layered overlay engine
//!
//! A read-only base dataset is combined with a locally persisted overlay of
//! upserts and tombstones. The base is never mutated; discarding the overlay
//! makes the base authoritative again.
//!
//! Two shapes are supported:
//!
//! - [`CollectionOverlay`]: keyed records (products). The persisted form is
//!   `{ "upsertsById": { id: record }, "deletedIds": [id] }`.
//! - [`SingletonOverlay`]: a single record (bank, company) replaced
//!   wholesale. The persisted form is the record itself; no key means
//!   "no override".
//!
//! Every mutation writes a full snapshot through the [`KeyValueStore`]
//! port. Unreadable persisted data is treated as an empty overlay.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use serde::de::Error as _;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{GstBillError, GstBillResult};
use crate::models::{BankDetails, CompanyDetails, Product};

use super::kv::KeyValueStore;

/// A record that can be rebuilt from loosely-typed JSON
pub trait OverlayRecord: Clone + Serialize {
    /// Decode a raw record; `None` when it is unusable
    fn decode(raw: &Value) -> Option<Self>;
}

/// A record with a stable string key
pub trait KeyedRecord: OverlayRecord {
    fn record_id(&self) -> &str;
}

impl OverlayRecord for Product {
    fn decode(raw: &Value) -> Option<Self> {
        Product::from_raw(raw)
    }
}

impl KeyedRecord for Product {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl OverlayRecord for BankDetails {
    fn decode(raw: &Value) -> Option<Self> {
        raw.is_object().then(|| BankDetails::from_raw(raw))
    }
}

impl OverlayRecord for CompanyDetails {
    fn decode(raw: &Value) -> Option<Self> {
        raw.is_object().then(|| CompanyDetails::from_raw(raw))
    }
}

/// Upserts and tombstones for a keyed collection
///
/// An id is never in both sets at once: upserting clears its tombstone and
/// removing clears its upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayState<T> {
    /// Upserted records in first-insertion order, unique by id
    upserts: Vec<T>,
    /// Tombstoned ids in the order they were removed
    deleted_ids: Vec<String>,
}

impl<T> Default for OverlayState<T> {
    fn default() -> Self {
        Self {
            upserts: Vec::new(),
            deleted_ids: Vec::new(),
        }
    }
}

impl<T: KeyedRecord> OverlayState<T> {
    /// True when the overlay holds no edits
    pub fn is_empty(&self) -> bool {
        self.upserts.is_empty() && self.deleted_ids.is_empty()
    }

    /// Upserted records in overlay-insertion order
    pub fn upserts(&self) -> &[T] {
        &self.upserts
    }

    /// Tombstoned ids
    pub fn deleted_ids(&self) -> &[String] {
        &self.deleted_ids
    }

    /// Look up an upserted record
    pub fn upsert_for(&self, id: &str) -> Option<&T> {
        self.upserts.iter().find(|r| r.record_id() == id)
    }

    /// Check whether an id is tombstoned
    pub fn is_deleted(&self, id: &str) -> bool {
        self.deleted_ids.iter().any(|d| d == id)
    }

    /// Insert or overwrite a record and lift any tombstone on its id
    ///
    /// An overwritten record keeps its original overlay position.
    pub fn upsert(&mut self, item: T) -> GstBillResult<()> {
        let id = item.record_id().to_string();
        if id.trim().is_empty() {
            return Err(GstBillError::Validation("Record id cannot be empty".into()));
        }

        self.deleted_ids.retain(|d| d != &id);
        match self.upserts.iter_mut().find(|r| r.record_id() == id) {
            Some(existing) => *existing = item,
            None => self.upserts.push(item),
        }
        Ok(())
    }

    /// Tombstone an id and drop any upsert for it
    pub fn remove(&mut self, id: &str) {
        self.upserts.retain(|r| r.record_id() != id);
        if !self.is_deleted(id) {
            self.deleted_ids.push(id.to_string());
        }
    }

    /// Drop all edits
    pub fn clear(&mut self) {
        self.upserts.clear();
        self.deleted_ids.clear();
    }

    /// Rebuild an overlay from its persisted JSON form
    ///
    /// Unusable records are skipped. An id listed in both sets is resolved in
    /// favour of the tombstone.
    pub fn from_value(value: &Value) -> GstBillResult<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| GstBillError::MalformedData("overlay is not a JSON object".into()))?;

        let mut state = Self::default();

        if let Some(upserts) = obj.get("upsertsById") {
            let upserts = upserts.as_object().ok_or_else(|| {
                GstBillError::MalformedData("upsertsById is not a JSON object".into())
            })?;
            for (key, raw) in upserts {
                match T::decode(raw) {
                    Some(record) => state.upsert(record)?,
                    None => tracing::warn!(id = %key, "skipping unreadable overlay record"),
                }
            }
        }

        if let Some(deleted) = obj.get("deletedIds") {
            let deleted = deleted.as_array().ok_or_else(|| {
                GstBillError::MalformedData("deletedIds is not a JSON array".into())
            })?;
            for id in deleted.iter().filter_map(Value::as_str) {
                state.remove(id);
            }
        }

        Ok(state)
    }
}

impl<T: KeyedRecord> Serialize for OverlayState<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct UpsertsById<'a, T>(&'a [T]);

        impl<T: KeyedRecord> Serialize for UpsertsById<'_, T> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_map(self.0.iter().map(|r| (r.record_id(), r)))
            }
        }

        let mut state = serializer.serialize_struct("OverlayState", 2)?;
        state.serialize_field("upsertsById", &UpsertsById(&self.upserts))?;
        state.serialize_field("deletedIds", &self.deleted_ids)?;
        state.end()
    }
}

impl<'de, T: KeyedRecord> Deserialize<'de> for OverlayState<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(&value).map_err(D::Error::custom)
    }
}

/// Combine a base snapshot with an overlay
///
/// Base order is preserved for ids that exist in base, upserts replace in
/// place, new ids follow in overlay-insertion order and tombstoned ids are
/// dropped. The result never contains duplicate ids.
pub fn merge<T: KeyedRecord>(base: &[T], overlay: &OverlayState<T>) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(base.len() + overlay.upserts.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for record in base.iter().chain(overlay.upserts.iter()) {
        match positions.get(record.record_id()) {
            Some(&pos) => merged[pos] = record.clone(),
            None => {
                positions.insert(record.record_id().to_string(), merged.len());
                merged.push(record.clone());
            }
        }
    }

    let deleted: HashSet<&str> = overlay.deleted_ids.iter().map(String::as_str).collect();
    merged.retain(|r| !deleted.contains(r.record_id()));
    merged
}

/// Decode a raw overlay string, falling back to empty on any error
fn decode_or_empty<S, F>(key: &str, raw: Option<String>, decode: F) -> S
where
    S: Default,
    F: FnOnce(&Value) -> GstBillResult<S>,
{
    let Some(raw) = raw else {
        return S::default();
    };

    match serde_json::from_str::<Value>(&raw)
        .map_err(|e| GstBillError::MalformedData(e.to_string()))
        .and_then(|value| decode(&value))
    {
        Ok(state) => state,
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable overlay");
            S::default()
        }
    }
}

fn read_port(port: &dyn KeyValueStore, key: &str) -> Option<String> {
    match port.read(key) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(key, error = %e, "overlay read failed, starting empty");
            None
        }
    }
}

fn persistence_failure(key: &str, err: GstBillError) -> GstBillError {
    tracing::warn!(key, error = %err, "overlay not persisted");
    GstBillError::PersistenceFailure(format!("{}: {}", key, err))
}

/// Persisted overlay for a keyed collection
pub struct CollectionOverlay<T> {
    key: &'static str,
    port: Arc<dyn KeyValueStore>,
    state: RwLock<OverlayState<T>>,
}

impl<T: KeyedRecord> CollectionOverlay<T> {
    /// Create an overlay bound to `key`; call [`load`](Self::load) to read it
    pub fn new(key: &'static str, port: Arc<dyn KeyValueStore>) -> Self {
        Self {
            key,
            port,
            state: RwLock::new(OverlayState::default()),
        }
    }

    /// Storage key this overlay persists under
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// (Re)load the overlay from the port
    ///
    /// Never fails: missing or unreadable data yields an empty overlay.
    pub fn load(&self) -> GstBillResult<()> {
        let raw = read_port(self.port.as_ref(), self.key);
        let loaded = decode_or_empty(self.key, raw, OverlayState::<T>::from_value);
        *self.write_lock()? = loaded;
        Ok(())
    }

    /// Snapshot of the current overlay state
    pub fn snapshot(&self) -> GstBillResult<OverlayState<T>> {
        Ok(self.read_lock()?.clone())
    }

    /// Merge the overlay over `base`
    pub fn merge(&self, base: &[T]) -> GstBillResult<Vec<T>> {
        let state = self.read_lock()?;
        Ok(merge(base, &state))
    }

    /// Insert or overwrite a record, then persist
    pub fn upsert(&self, item: T) -> GstBillResult<()> {
        self.mutate(|state| state.upsert(item))
    }

    /// Tombstone an id, then persist
    pub fn remove(&self, id: &str) -> GstBillResult<()> {
        self.mutate(|state| {
            state.remove(id);
            Ok(())
        })
    }

    /// Discard every local edit
    pub fn clear(&self) -> GstBillResult<()> {
        self.write_lock()?.clear();
        self.port
            .delete(self.key)
            .map_err(|e| persistence_failure(self.key, e))
    }

    /// Apply a change in memory, then write the full snapshot
    ///
    /// The in-memory view keeps the change even when the write fails.
    fn mutate<F>(&self, change: F) -> GstBillResult<()>
    where
        F: FnOnce(&mut OverlayState<T>) -> GstBillResult<()>,
    {
        let serialized = {
            let mut state = self.write_lock()?;
            change(&mut state)?;
            serde_json::to_string(&*state)?
        };

        self.port
            .write(self.key, &serialized)
            .map_err(|e| persistence_failure(self.key, e))
    }

    fn read_lock(&self) -> GstBillResult<std::sync::RwLockReadGuard<'_, OverlayState<T>>> {
        self.state
            .read()
            .map_err(|e| GstBillError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write_lock(&self) -> GstBillResult<std::sync::RwLockWriteGuard<'_, OverlayState<T>>> {
        self.state
            .write()
            .map_err(|e| GstBillError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

/// Persisted wholesale override for a single record
pub struct SingletonOverlay<T> {
    key: &'static str,
    port: Arc<dyn KeyValueStore>,
    value: RwLock<Option<T>>,
}

impl<T: OverlayRecord> SingletonOverlay<T> {
    pub fn new(key: &'static str, port: Arc<dyn KeyValueStore>) -> Self {
        Self {
            key,
            port,
            value: RwLock::new(None),
        }
    }

    /// (Re)load the override from the port; unreadable data means no override
    pub fn load(&self) -> GstBillResult<()> {
        let raw = read_port(self.port.as_ref(), self.key);
        let loaded: Option<T> = decode_or_empty(self.key, raw, |value| {
            if value.is_null() {
                return Ok(None);
            }
            T::decode(value)
                .map(Some)
                .ok_or_else(|| GstBillError::MalformedData("override is not a JSON object".into()))
        });
        *self.write_lock()? = loaded;
        Ok(())
    }

    /// Current override, if any
    pub fn get(&self) -> GstBillResult<Option<T>> {
        let value = self
            .value
            .read()
            .map_err(|e| GstBillError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(value.clone())
    }

    /// Replace the override; `None` defers to the base record again
    pub fn set(&self, next: Option<T>) -> GstBillResult<()> {
        let serialized = next.as_ref().map(serde_json::to_string).transpose()?;
        *self.write_lock()? = next;

        let result = match serialized {
            Some(json) => self.port.write(self.key, &json),
            None => self.port.delete(self.key),
        };
        result.map_err(|e| persistence_failure(self.key, e))
    }

    fn write_lock(&self) -> GstBillResult<std::sync::RwLockWriteGuard<'_, Option<T>>> {
        self.value
            .write()
            .map_err(|e| GstBillError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;
    use crate::storage::kv::MemoryKvStore;
    use serde_json::json;

    fn product(id: &str, name: &str, price: f64) -> Product {
        Product::with_id(id, name, Money::from_rupees(price))
    }

    fn ids(list: &[Product]) -> Vec<&str> {
        list.iter().map(|p| p.id.as_str()).collect()
    }

    struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn read(&self, _key: &str) -> GstBillResult<Option<String>> {
            Ok(None)
        }
        fn write(&self, _key: &str, _value: &str) -> GstBillResult<()> {
            Err(GstBillError::Storage("quota exceeded".into()))
        }
        fn delete(&self, _key: &str) -> GstBillResult<()> {
            Err(GstBillError::Storage("quota exceeded".into()))
        }
    }

    #[test]
    fn test_merge_order_and_tombstones() {
        let base = vec![product("a", "A", 1.0), product("b", "B", 2.0), product("c", "C", 3.0)];
        let mut overlay = OverlayState::default();
        overlay.upsert(product("new2", "N2", 5.0)).unwrap();
        overlay.upsert(product("b", "B2", 20.0)).unwrap();
        overlay.upsert(product("new1", "N1", 4.0)).unwrap();
        overlay.remove("c");

        let merged = merge(&base, &overlay);
        assert_eq!(ids(&merged), vec!["a", "b", "new2", "new1"]);
        assert_eq!(merged[1].name, "B2");
    }

    #[test]
    fn test_merge_never_contains_deleted_ids() {
        let base = vec![product("a", "A", 1.0), product("b", "B", 2.0)];
        let mut overlay = OverlayState::default();
        overlay.upsert(product("z", "Z", 1.0)).unwrap();
        overlay.remove("a");
        overlay.remove("z");
        overlay.remove("not-in-base");

        let merged = merge(&base, &overlay);
        assert_eq!(ids(&merged), vec!["b"]);
        for id in overlay.deleted_ids() {
            assert!(merged.iter().all(|p| &p.id != id));
        }
        for upsert in overlay.upserts() {
            let found = merged.iter().find(|p| p.id == upsert.id).unwrap();
            assert_eq!(found, upsert);
        }
    }

    #[test]
    fn test_merge_deduplicates_base() {
        let base = vec![product("a", "First", 1.0), product("a", "Second", 2.0)];
        let merged = merge(&base, &OverlayState::default());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].name, "Second");
    }

    #[test]
    fn test_delete_after_upsert_collapses() {
        let mut both = OverlayState::default();
        both.upsert(product("x", "X", 1.0)).unwrap();
        both.remove("x");

        let mut only_remove = OverlayState::<Product>::default();
        only_remove.remove("x");

        assert_eq!(both, only_remove);
    }

    #[test]
    fn test_upsert_after_delete_resurrects() {
        let mut both = OverlayState::default();
        both.remove("x");
        both.upsert(product("x", "X", 1.0)).unwrap();

        let mut only_upsert = OverlayState::default();
        only_upsert.upsert(product("x", "X", 1.0)).unwrap();

        assert_eq!(both, only_upsert);
        assert!(!both.is_deleted("x"));
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut once = OverlayState::default();
        once.upsert(product("x", "X", 1.0)).unwrap();

        let mut twice = once.clone();
        twice.upsert(product("x", "X", 1.0)).unwrap();

        assert_eq!(once, twice);

        let mut removed_twice = OverlayState::<Product>::default();
        removed_twice.remove("y");
        removed_twice.remove("y");
        assert_eq!(removed_twice.deleted_ids(), &["y".to_string()][..]);
    }

    #[test]
    fn test_upsert_requires_id() {
        let mut overlay = OverlayState::default();
        let err = overlay.upsert(product(" ", "Nameless", 1.0)).unwrap_err();
        assert!(err.is_validation());
        assert!(overlay.is_empty());
    }

    #[test]
    fn test_serialization_round_trip_preserves_merge() {
        let base = vec![product("a", "A", 1.0), product("b", "B", 2.0)];
        let mut overlay = OverlayState::default();
        overlay.upsert(product("c", "C", 3.0)).unwrap();
        overlay.upsert(product("a", "A2", 1.5)).unwrap();
        overlay.remove("b");

        let json = serde_json::to_string(&overlay).unwrap();
        let restored: OverlayState<Product> = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, overlay);
        assert_eq!(merge(&base, &restored), merge(&base, &overlay));
    }

    #[test]
    fn test_wire_shape() {
        let mut overlay = OverlayState::default();
        overlay.upsert(product("t1", "Tea", 10.0)).unwrap();
        overlay.remove("t9");

        assert_eq!(
            serde_json::to_value(&overlay).unwrap(),
            json!({
                "upsertsById": {"t1": {"id": "t1", "name": "Tea", "price": 10.0}},
                "deletedIds": ["t9"]
            })
        );
    }

    #[test]
    fn test_conflicting_persisted_state_prefers_tombstone() {
        let raw = json!({
            "upsertsById": {"x": {"id": "x", "name": "X", "price": 1}},
            "deletedIds": ["x"]
        });
        let state = OverlayState::<Product>::from_value(&raw).unwrap();
        assert!(state.upserts().is_empty());
        assert!(state.is_deleted("x"));
    }

    #[test]
    fn test_collection_overlay_persists_every_write() {
        let port: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let overlay = CollectionOverlay::<Product>::new("products_test", port.clone());
        overlay.load().unwrap();

        overlay.upsert(product("a", "A", 1.0)).unwrap();
        overlay.remove("b").unwrap();

        let reloaded = CollectionOverlay::<Product>::new("products_test", port.clone());
        reloaded.load().unwrap();
        assert_eq!(reloaded.snapshot().unwrap(), overlay.snapshot().unwrap());

        overlay.clear().unwrap();
        assert!(port.read("products_test").unwrap().is_none());
        assert!(overlay.snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_collection_overlay_merges_over_base() {
        let port: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let overlay = CollectionOverlay::<Product>::new("products_test", port);
        overlay.load().unwrap();
        overlay.upsert(product("b", "B2", 5.0)).unwrap();
        overlay.remove("a").unwrap();

        let base = vec![product("a", "A", 1.0), product("b", "B", 2.0)];
        let merged = overlay.merge(&base).unwrap();
        assert_eq!(merged, vec![product("b", "B2", 5.0)]);
    }

    #[test]
    fn test_malformed_overlay_self_heals() {
        let port: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        port.write("products_test", "{not json").unwrap();

        let overlay = CollectionOverlay::<Product>::new("products_test", port.clone());
        overlay.load().unwrap();
        assert!(overlay.snapshot().unwrap().is_empty());

        overlay.upsert(product("a", "A", 1.0)).unwrap();
        let raw = port.read("products_test").unwrap().unwrap();
        let healed: OverlayState<Product> = serde_json::from_str(&raw).unwrap();
        assert_eq!(healed.upserts().len(), 1);
    }

    #[test]
    fn test_wrong_shape_overlay_is_empty() {
        let port: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        // Legacy format: a bare array of products
        port.write("products_test", r#"[{"id":"a","name":"A","price":1}]"#)
            .unwrap();

        let overlay = CollectionOverlay::<Product>::new("products_test", port);
        overlay.load().unwrap();
        assert!(overlay.snapshot().unwrap().is_empty());
    }

    #[test]
    fn test_persistence_failure_keeps_memory_state() {
        let overlay = CollectionOverlay::<Product>::new("products_test", Arc::new(FailingStore));
        overlay.load().unwrap();

        let err = overlay.upsert(product("a", "A", 1.0)).unwrap_err();
        assert!(err.is_persistence_failure());
        assert_eq!(overlay.merge(&[]).unwrap().len(), 1);
    }

    #[test]
    fn test_singleton_overlay() {
        let port: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let overlay = SingletonOverlay::<BankDetails>::new("bank_test", port.clone());
        overlay.load().unwrap();
        assert!(overlay.get().unwrap().is_none());

        let bank = BankDetails {
            bank_name: Some("SBI".into()),
            ..Default::default()
        };
        overlay.set(Some(bank.clone())).unwrap();

        let reloaded = SingletonOverlay::<BankDetails>::new("bank_test", port.clone());
        reloaded.load().unwrap();
        assert_eq!(reloaded.get().unwrap(), Some(bank));

        overlay.set(None).unwrap();
        assert!(port.read("bank_test").unwrap().is_none());
        assert!(overlay.get().unwrap().is_none());
    }

    #[test]
    fn test_singleton_null_and_garbage() {
        let port: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let overlay = SingletonOverlay::<CompanyDetails>::new("company_test", port.clone());

        port.write("company_test", "null").unwrap();
        overlay.load().unwrap();
        assert!(overlay.get().unwrap().is_none());

        port.write("company_test", "\"just a string\"").unwrap();
        overlay.load().unwrap();
        assert!(overlay.get().unwrap().is_none());

        let legacy = json!({"company_name": "Acme", "gstin": "29AAA"});
        port.write("company_test", &legacy.to_string()).unwrap();
        overlay.load().unwrap();
        let company = overlay.get().unwrap().unwrap();
        assert_eq!(company.name.as_deref(), Some("Acme"));
        assert_eq!(company.gst.as_deref(), Some("29AAA"));
    }
}
