//! gstbill - Terminal GST invoice builder
//!
//! This library provides the core of the gstbill application: reference
//! datasets (products, bank details, company details) that can be edited
//! locally without touching the shared base files, and a GST invoice
//! calculator with Indian-numbering amount-in-words output.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Paths and user settings
//! - `error`: Custom error types
//! - `models`: Core data models (products, bank/company details, invoices, money)
//! - `storage`: Base-dataset sources, the key-value persistence port, and overlay merging
//! - `services`: Catalog edits, invoice draft session, totals calculation
//! - `display`: Terminal formatting and amount-in-words conversion
//! - `export`: JSON and CSV export
//! - `cli`: clap subcommands and their handlers
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use gstbill_cli::config::paths::GstBillPaths;
//! use gstbill_cli::models::{Money, TaxesPatch};
//! use gstbill_cli::services::InvoiceDraftSession;
//! use gstbill_cli::storage::{MemoryKvStore, StaticSource, Storage};
//! use serde_json::json;
//!
//! let paths = GstBillPaths::with_base_dir(std::env::temp_dir().join("gstbill-doc"));
//! let storage = Storage::with_port(paths, Arc::new(MemoryKvStore::new()));
//! storage.load_all(&StaticSource {
//!     products: Some(json!([{"id": "tea", "name": "Masala Tea", "price": 100}])),
//!     ..Default::default()
//! })?;
//!
//! let mut session = InvoiceDraftSession::new();
//! session.add_product("tea", 2.0, &storage.products)?;
//! session.set_taxes(TaxesPatch { igst: Some(Some(18.0)), ..Default::default() });
//!
//! let totals = session.totals();
//! assert_eq!(totals.grand_total, Money::from_rupees(236.0));
//! assert_eq!(totals.words, "Two hundred thirty six rupees only.");
//! # Ok::<(), gstbill_cli::error::GstBillError>(())
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod services;
pub mod storage;

pub use error::GstBillError;
