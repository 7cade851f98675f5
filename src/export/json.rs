//! JSON export
//!
//! Two documents: a single invoice with its derived totals, and the
//! effective catalog (merged products plus bank and company details).

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::display::words::to_title_words;
use crate::error::{GstBillError, GstBillResult};
use crate::models::{
    BankDetails, CompanyDetails, InvoiceDraft, InvoiceItem, InvoiceMeta, InvoiceTotals, Party,
    Product, Taxes,
};
use crate::services::InvoiceCalculator;
use crate::storage::Storage;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// A rendered invoice
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub company: Party,
    pub client: Party,
    pub invoice: InvoiceMeta,
    pub items: Vec<InvoiceItem>,
    pub taxes: Taxes,
    pub totals: InvoiceTotals,
    /// Grand total in the "Indian Rupees ... only" style
    pub amount_in_words: String,
    pub bank: BankDetails,
    /// Watermark text, present only when it would be shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<String>,
}

impl InvoiceExport {
    pub fn new(draft: &InvoiceDraft, bank: BankDetails) -> Self {
        let totals = InvoiceCalculator::calculate(&draft.items, &draft.taxes);
        Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            company: draft.company.clone(),
            client: draft.client.clone(),
            invoice: draft.invoice.clone(),
            items: draft.items.clone(),
            taxes: draft.taxes.clone(),
            amount_in_words: to_title_words(totals.grand_total),
            totals,
            bank,
            watermark: draft
                .watermark
                .is_visible()
                .then(|| draft.watermark.text.clone()),
        }
    }
}

/// The effective catalog
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogExport {
    pub schema_version: String,
    pub exported_at: DateTime<Utc>,
    pub products: Vec<Product>,
    pub bank: BankDetails,
    pub company: CompanyDetails,
}

impl CatalogExport {
    pub fn from_storage(storage: &Storage) -> GstBillResult<Self> {
        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            products: storage.products.list()?,
            bank: storage.bank.get()?,
            company: storage.company.get()?,
        })
    }
}

/// Write an invoice as JSON
pub fn export_invoice_json<W: Write>(
    draft: &InvoiceDraft,
    bank: BankDetails,
    writer: &mut W,
    pretty: bool,
) -> GstBillResult<()> {
    write_json(writer, &InvoiceExport::new(draft, bank), pretty)
}

/// Write the effective catalog as JSON
pub fn export_catalog_json<W: Write>(
    storage: &Storage,
    writer: &mut W,
    pretty: bool,
) -> GstBillResult<()> {
    write_json(writer, &CatalogExport::from_storage(storage)?, pretty)
}

fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T, pretty: bool) -> GstBillResult<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, value)
    } else {
        serde_json::to_writer(&mut *writer, value)
    }
    .map_err(|e| GstBillError::Export(e.to_string()))?;

    writeln!(writer).map_err(|e| GstBillError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::GstBillPaths;
    use crate::models::Money;
    use crate::storage::{KeyValueStore, MemoryKvStore, StaticSource};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_invoice_export_shape() {
        let draft = InvoiceDraft {
            items: vec![InvoiceItem::new("Tea", Money::from_rupees(100.0), 1.5)],
            taxes: Taxes {
                igst: Some(18.0),
                ..Default::default()
            },
            ..Default::default()
        };

        let mut buffer = Vec::new();
        export_invoice_json(&draft, BankDetails::default(), &mut buffer, false).unwrap();
        let value: Value = serde_json::from_slice(&buffer).unwrap();

        assert_eq!(value["schemaVersion"], EXPORT_SCHEMA_VERSION);
        assert_eq!(value["items"][0]["amount"], json!(150.0));
        assert_eq!(value["totals"]["igstAmt"], json!(27.0));
        assert_eq!(value["totals"]["grandTotal"], json!(177.0));
        assert_eq!(value["totals"]["words"], "One hundred seventy seven rupees only.");
        assert_eq!(value["amountInWords"], "Indian Rupees One Hundred Seventy Seven only");
        assert!(value.get("watermark").is_none());
    }

    #[test]
    fn test_catalog_export_reflects_overlay() {
        let temp_dir = TempDir::new().unwrap();
        let paths = GstBillPaths::with_base_dir(temp_dir.path().to_path_buf());
        let port: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
        let storage = Storage::with_port(paths, port);
        storage
            .load_all(&StaticSource {
                products: Some(json!([{"id": "a", "name": "A", "price": 1}, {"id": "b", "name": "B", "price": 2}])),
                ..Default::default()
            })
            .unwrap();
        storage.products.delete("a").unwrap();

        let mut buffer = Vec::new();
        export_catalog_json(&storage, &mut buffer, true).unwrap();
        let value: Value = serde_json::from_slice(&buffer).unwrap();

        let products = value["products"].as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["id"], "b");
    }
}
