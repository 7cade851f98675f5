//! Custom error types for gstbill
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for gstbill operations
#[derive(Error, Debug)]
pub enum GstBillError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors (also used when a base dataset is absent)
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// A base dataset source exists but could not be reached or read
    #[error("Source unavailable: {0}")]
    Unavailable(String),

    /// Stored or fetched data could not be parsed
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Writing to the key-value persistence port failed
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl GstBillError {
    /// Create a "not found" error for products
    pub fn product_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Product",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for invoice line items
    pub fn item_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Line item",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for a base dataset
    pub fn dataset_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Dataset",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error means an edit was applied but not persisted
    pub fn is_persistence_failure(&self) -> bool {
        matches!(self, Self::PersistenceFailure(_))
    }
}

impl From<std::io::Error> for GstBillError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GstBillError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<csv::Error> for GstBillError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for gstbill operations
pub type GstBillResult<T> = Result<T, GstBillError>;
