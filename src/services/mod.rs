//! Service layer for gstbill
//!
//! Business logic on top of the storage layer: catalog edits with
//! validation, the invoice draft session, and totals calculation.

pub mod catalog;
pub mod draft;
pub mod invoice;

pub use catalog::{CatalogService, ProductUpdate};
pub use draft::{InvoiceDraftSession, WatermarkPatch};
pub use invoice::{InvoiceCalculator, TaxLine};
