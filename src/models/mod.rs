//! Core data models for gstbill
//!
//! This module contains the data structures of the invoicing domain:
//! catalog products, bank and company details, invoice lines and taxes.

pub mod alias;
pub mod bank;
pub mod company;
pub mod invoice;
pub mod money;
pub mod product;

pub use bank::BankDetails;
pub use company::CompanyDetails;
pub use invoice::{
    InvoiceDraft, InvoiceItem, InvoiceMeta, InvoiceMetaPatch, InvoiceTotals, Party, PartyPatch, Taxes,
    TaxesPatch, Watermark,
};
pub use money::{Money, MoneyParseError};
pub use product::{Product, ProductValidationError};
