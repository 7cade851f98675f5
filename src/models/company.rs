//! Company details model
//!
//! The issuing company's letterhead details.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::alias::{resolve, FieldAliases};

const COMPANY_ALIASES: &[FieldAliases] = &[
    ("name", &["name", "companyName", "company_name"]),
    ("gst", &["gst", "gstin", "gst_number"]),
    ("address", &["address"]),
    ("phone", &["phone", "mobile"]),
    ("email", &["email"]),
];

/// Canonical company details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// GSTIN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gst: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CompanyDetails {
    /// Normalize a raw record through the alias table
    pub fn from_raw(raw: &Value) -> Self {
        let Some(obj) = raw.as_object() else {
            return Self::default();
        };

        Self {
            name: resolve(obj, COMPANY_ALIASES, "name"),
            gst: resolve(obj, COMPANY_ALIASES, "gst"),
            address: resolve(obj, COMPANY_ALIASES, "address"),
            phone: resolve(obj, COMPANY_ALIASES, "phone"),
            email: resolve(obj, COMPANY_ALIASES, "email"),
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
