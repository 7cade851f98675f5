//! Path management for gstbill
//!
//! ## Path Resolution Order
//!
//! 1. `GSTBILL_DATA_DIR` environment variable (if set)
//! 2. The platform config directory from `directories` (e.g. `~/.config/gstbill`)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::GstBillError;

/// Manages all paths used by gstbill
#[derive(Debug, Clone)]
pub struct GstBillPaths {
    /// Base directory for all gstbill data
    base_dir: PathBuf,
}

impl GstBillPaths {
    /// Create a new GstBillPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and
    /// `GSTBILL_DATA_DIR` is not set.
    pub fn new() -> Result<Self, GstBillError> {
        let base_dir = if let Ok(custom) = std::env::var("GSTBILL_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            resolve_default_path()?
        };

        Ok(Self { base_dir })
    }

    /// Create GstBillPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Directory holding locally persisted overlays and the invoice draft
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Default directory for the read-only base datasets
    pub fn dataset_dir(&self) -> PathBuf {
        self.base_dir.join("base")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the in-progress invoice draft
    pub fn draft_file(&self) -> PathBuf {
        self.data_dir().join("draft.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> Result<(), GstBillError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| GstBillError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| GstBillError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if gstbill has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, GstBillError> {
    ProjectDirs::from("", "", "gstbill")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| GstBillError::Config("Could not determine a home directory".into()))
}
