//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod bank;
pub mod company;
pub mod export;
pub mod invoice;
pub mod product;

pub use bank::{handle_bank_command, BankCommands};
pub use company::{handle_company_command, CompanyCommands};
pub use export::{handle_export_command, ExportCommands};
pub use invoice::{handle_invoice_command, InvoiceCommands};
pub use product::{handle_product_command, ProductCommands};

use crate::error::{GstBillError, GstBillResult};
use crate::models::Money;

/// Parse a rupee amount given on the command line
pub(crate) fn parse_money(s: &str) -> GstBillResult<Money> {
    Money::parse(s).map_err(|e| GstBillError::Validation(format!("'{}': {}", s, e)))
}

/// Turn an empty argument into "unset"
pub(crate) fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Report a failed overlay write without aborting the command
///
/// The edit is applied for the rest of this process but was not stored,
/// so it is gone on the next run. Returns `None` in that case.
pub(crate) fn persisted<T>(result: GstBillResult<T>) -> GstBillResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(GstBillError::PersistenceFailure(reason)) => {
            tracing::warn!(%reason, "overlay write failed");
            eprintln!("Warning: change could not be saved and will be lost on the next run ({})", reason);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("₹1,200.50").unwrap(), Money::from_paise(120050));
        assert!(parse_money("abc").unwrap_err().is_validation());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  ".into()), None);
        assert_eq!(non_empty(" SBI ".into()).as_deref(), Some("SBI"));
    }

    #[test]
    fn test_persisted() {
        assert_eq!(persisted(Ok(3)).unwrap(), Some(3));
        assert_eq!(
            persisted::<()>(Err(GstBillError::PersistenceFailure("disk full".into()))).unwrap(),
            None
        );
        assert!(persisted::<()>(Err(GstBillError::Validation("bad".into()))).is_err());
    }
}
