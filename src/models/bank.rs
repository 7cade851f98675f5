//! Bank details model
//!
//! The single bank record printed on every invoice.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::alias::{first_text, resolve, FieldAliases};

/// Accepted raw keys per canonical bank field
const BANK_ALIASES: &[FieldAliases] = &[
    ("bankName", &["bankName", "bank_name", "bank"]),
    ("accountNo", &["accountNo", "account_number", "accountNumber"]),
    ("pan", &["pan", "companyPan"]),
    ("branchIfsc", &["branchIfsc", "branch_ifsc"]),
];

/// Canonical bank details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_no: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<String>,

    /// Branch name and IFSC code on one line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_ifsc: Option<String>,
}

impl BankDetails {
    /// Normalize a raw record through the alias table
    ///
    /// When no combined branch/IFSC field is present, `branch` and `ifsc`
    /// are joined with a space.
    pub fn from_raw(raw: &Value) -> Self {
        let Some(obj) = raw.as_object() else {
            return Self::default();
        };

        let branch_ifsc = resolve(obj, BANK_ALIASES, "branchIfsc").or_else(|| {
            let joined = [first_text(obj, &["branch"]), first_text(obj, &["ifsc"])]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            (!joined.is_empty()).then_some(joined)
        });

        Self {
            bank_name: resolve(obj, BANK_ALIASES, "bankName"),
            account_no: resolve(obj, BANK_ALIASES, "accountNo"),
            pan: resolve(obj, BANK_ALIASES, "pan"),
            branch_ifsc,
        }
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
