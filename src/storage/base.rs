//! Base dataset sources
//!
//! Base datasets are read-only and owned by whoever publishes them. A source
//! hands back raw JSON; shaping it into typed records happens in the
//! repositories so that alias resolution lives in one place.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;

use crate::error::{GstBillError, GstBillResult};

/// File names used by [`JsonFileSource`]
pub const PRODUCTS_FILE: &str = "products.json";
pub const BANK_FILE: &str = "bankdetails.json";
pub const COMPANY_FILE: &str = "companydetails.json";

/// Fetch contract for the three base datasets
///
/// Implementations fail with `NotFound` when a dataset is absent and with
/// `Unavailable` when it exists but cannot be read.
pub trait BaseSource {
    /// A JSON array of product records
    fn fetch_products(&self) -> GstBillResult<Value>;

    /// A JSON object with bank details
    fn fetch_bank(&self) -> GstBillResult<Value>;

    /// A JSON object with company details
    fn fetch_company(&self) -> GstBillResult<Value>;
}

/// Reads base datasets from a directory of JSON files
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn fetch(&self, file: &str) -> GstBillResult<Value> {
        let path = self.dir.join(file);
        let contents = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GstBillError::dataset_not_found(path.display().to_string())
            } else {
                GstBillError::Unavailable(format!("{}: {}", path.display(), e))
            }
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            GstBillError::MalformedData(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}

impl BaseSource for JsonFileSource {
    fn fetch_products(&self) -> GstBillResult<Value> {
        self.fetch(PRODUCTS_FILE)
    }

    fn fetch_bank(&self) -> GstBillResult<Value> {
        self.fetch(BANK_FILE)
    }

    fn fetch_company(&self) -> GstBillResult<Value> {
        self.fetch(COMPANY_FILE)
    }
}

/// Serves fixed in-memory datasets; a `None` dataset reports `NotFound`
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub products: Option<Value>,
    pub bank: Option<Value>,
    pub company: Option<Value>,
}

impl StaticSource {
    fn serve(value: &Option<Value>, name: &str) -> GstBillResult<Value> {
        value
            .clone()
            .ok_or_else(|| GstBillError::dataset_not_found(name))
    }
}

impl BaseSource for StaticSource {
    fn fetch_products(&self) -> GstBillResult<Value> {
        Self::serve(&self.products, PRODUCTS_FILE)
    }

    fn fetch_bank(&self) -> GstBillResult<Value> {
        Self::serve(&self.bank, BANK_FILE)
    }

    fn fetch_company(&self) -> GstBillResult<Value> {
        Self::serve(&self.company, COMPANY_FILE)
    }
}

/// Run a fetch, degrading any failure to `None` with a warning
pub(crate) fn fetch_or_empty<F>(dataset: &str, fetch: F) -> Option<Value>
where
    F: FnOnce() -> GstBillResult<Value>,
{
    match fetch() {
        Ok(value) => Some(value),
        Err(e) if e.is_not_found() => {
            tracing::warn!(dataset, "base dataset not found, using empty base");
            None
        }
        Err(e) => {
            tracing::warn!(dataset, error = %e, "base dataset unusable, using empty base");
            None
        }
    }
}
