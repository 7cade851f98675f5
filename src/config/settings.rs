//! User settings for gstbill
//!
//! Manages where base datasets are read from and the default tax rates
//! applied to a fresh invoice draft.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::GstBillPaths;
use crate::error::GstBillError;

/// User settings for gstbill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Directory holding products.json / bankdetails.json / companydetails.json.
    /// Falls back to `<base>/base` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_dir: Option<PathBuf>,

    /// CGST percentage pre-filled on a new draft
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_cgst: Option<f64>,

    /// SGST percentage pre-filled on a new draft
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_sgst: Option<f64>,

    /// IGST percentage pre-filled on a new draft
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_igst: Option<f64>,

    /// Currency symbol used in rendered invoices
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "₹".to_string()
}

fn default_date_format() -> String {
    "%d-%m-%Y".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            dataset_dir: None,
            default_cgst: None,
            default_sgst: None,
            default_igst: None,
            currency_symbol: default_currency(),
            date_format: default_date_format(),
        }
    }
}

impl Settings {
    /// Resolve the directory base datasets are read from
    pub fn dataset_dir(&self, paths: &GstBillPaths) -> PathBuf {
        self.dataset_dir
            .clone()
            .unwrap_or_else(|| paths.dataset_dir())
    }

    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &GstBillPaths) -> Result<Self, GstBillError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                GstBillError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                GstBillError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &GstBillPaths) -> Result<(), GstBillError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            GstBillError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            GstBillError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.currency_symbol, "₹");
        assert!(settings.default_cgst.is_none());
        assert!(settings.dataset_dir.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GstBillPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        settings.default_cgst = Some(9.0);
        settings.default_sgst = Some(9.0);
        settings.save(&paths).unwrap();

        let loaded = Settings::load_or_create(&paths).unwrap();
        assert_eq!(loaded.default_cgst, Some(9.0));
        assert_eq!(loaded.default_sgst, Some(9.0));
        assert!(loaded.default_igst.is_none());
    }

    #[test]
    fn test_dataset_dir_fallback() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GstBillPaths::with_base_dir(temp_dir.path().to_path_buf());

        let mut settings = Settings::default();
        assert_eq!(settings.dataset_dir(&paths), temp_dir.path().join("base"));

        settings.dataset_dir = Some(PathBuf::from("/srv/shared"));
        assert_eq!(settings.dataset_dir(&paths), PathBuf::from("/srv/shared"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"default_igst": 18}"#).unwrap();
        assert_eq!(settings.schema_version, 1);
        assert_eq!(settings.default_igst, Some(18.0));
        assert_eq!(settings.date_format, "%d-%m-%Y");
    }
}
