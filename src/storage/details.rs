//! Bank and company detail repositories
//!
//! Both are single records: a locally saved override replaces the base
//! record wholesale, and deleting the override falls back to the base.

use std::sync::{Arc, RwLock};

use crate::error::{GstBillError, GstBillResult};
use crate::models::{BankDetails, CompanyDetails};

use super::base::{fetch_or_empty, BaseSource};
use super::kv::KeyValueStore;
use super::overlay::{OverlayRecord, SingletonOverlay};

pub const BANK_OVERLAY_KEY: &str = "bankdetails_overrides";
pub const COMPANY_OVERLAY_KEY: &str = "companydetails_overrides";

/// Repository for bank details
pub type BankRepository = DetailsRepository<BankDetails>;

/// Repository for company details
pub type CompanyRepository = DetailsRepository<CompanyDetails>;

/// Which base dataset a details repository reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dataset {
    Bank,
    Company,
}

/// Base record plus wholesale override
pub struct DetailsRepository<T> {
    dataset: Dataset,
    base: RwLock<Option<T>>,
    overlay: SingletonOverlay<T>,
}

impl BankRepository {
    pub fn new(port: Arc<dyn KeyValueStore>) -> Self {
        Self::with_dataset(Dataset::Bank, BANK_OVERLAY_KEY, port)
    }
}

impl CompanyRepository {
    pub fn new(port: Arc<dyn KeyValueStore>) -> Self {
        Self::with_dataset(Dataset::Company, COMPANY_OVERLAY_KEY, port)
    }
}

impl<T: OverlayRecord + Default> DetailsRepository<T> {
    fn with_dataset(dataset: Dataset, key: &'static str, port: Arc<dyn KeyValueStore>) -> Self {
        Self {
            dataset,
            base: RwLock::new(None),
            overlay: SingletonOverlay::new(key, port),
        }
    }

    /// Fetch the base record and read the persisted override
    pub fn load(&self, source: &dyn BaseSource) -> GstBillResult<()> {
        let raw = match self.dataset {
            Dataset::Bank => fetch_or_empty("bank", || source.fetch_bank()),
            Dataset::Company => fetch_or_empty("company", || source.fetch_company()),
        };

        let base = raw.and_then(|value| {
            let decoded = T::decode(&value);
            if decoded.is_none() {
                tracing::warn!(dataset = ?self.dataset, "base record is not a JSON object");
            }
            decoded
        });

        *self.base.write().map_err(|e| {
            GstBillError::Storage(format!("Failed to acquire write lock: {}", e))
        })? = base;

        self.overlay.load()
    }

    /// Effective record: the override if set, else the base, else empty
    pub fn get(&self) -> GstBillResult<T> {
        if let Some(value) = self.overlay.get()? {
            return Ok(value);
        }
        Ok(self.base()?.unwrap_or_default())
    }

    /// The base record, if one was fetched
    pub fn base(&self) -> GstBillResult<Option<T>> {
        let base = self.base.read().map_err(|e| {
            GstBillError::Storage(format!("Failed to acquire read lock: {}", e))
        })?;
        Ok(base.clone())
    }

    /// Check whether a local override is in effect
    pub fn has_override(&self) -> GstBillResult<bool> {
        Ok(self.overlay.get()?.is_some())
    }

    /// Replace the record with a local override
    pub fn save(&self, value: T) -> GstBillResult<()> {
        tracing::debug!(dataset = ?self.dataset, "saving override");
        self.overlay.set(Some(value))
    }

    /// Drop the local override, deferring to the base record
    pub fn delete(&self) -> GstBillResult<()> {
        tracing::debug!(dataset = ?self.dataset, "dropping override");
        self.overlay.set(None)
    }
}
