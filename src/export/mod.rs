//! Export module for gstbill
//!
//! - JSON: a single invoice with totals, or the effective catalog
//! - CSV: invoice line items, or the product list

pub mod csv;
pub mod json;

pub use csv::{export_items_csv, export_products_csv};
pub use json::{
    export_catalog_json, export_invoice_json, CatalogExport, InvoiceExport, EXPORT_SCHEMA_VERSION,
};
