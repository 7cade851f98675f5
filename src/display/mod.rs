//! Display formatting for terminal output
//!
//! Formats products, detail records, and invoices as plain text, and
//! converts amounts to words.

pub mod invoice;
pub mod product;
pub mod words;

pub use invoice::{format_bank_details, format_invoice, format_items, format_totals, InvoiceFormat};
pub use product::{format_bank, format_company, format_product_details, format_product_list};
pub use words::{to_sentence, to_title_words};
