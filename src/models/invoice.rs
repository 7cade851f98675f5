//! Invoice models
//!
//! Line items, tax rates and the header fields of an invoice draft. Totals
//! are never stored; see `services::invoice` for how they are derived.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::money::Money;

/// A single invoice line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    /// Unique within the draft
    pub id: String,

    pub name: String,

    /// Unit rate
    pub rate: Money,

    /// Quantity; may be fractional (e.g. 1.5 kg)
    pub qty: f64,

    /// Always `round2(qty * rate)`
    pub amount: Money,

    /// HSN/SAC code, carried through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hsn: Option<String>,

    /// Product this line was filled from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
}

impl InvoiceItem {
    /// A blank line: no name, zero rate, quantity one
    pub fn blank() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: String::new(),
            rate: Money::zero(),
            qty: 1.0,
            amount: Money::zero(),
            hsn: None,
            product_id: None,
        }
    }

    /// Build a line with the amount already computed
    pub fn new(name: impl Into<String>, rate: Money, qty: f64) -> Self {
        let mut item = Self {
            name: name.into(),
            rate,
            qty,
            ..Self::blank()
        };
        item.recompute();
        item
    }

    /// Recompute `amount` from `qty * rate`
    pub fn recompute(&mut self) {
        self.amount = self.rate.times(self.qty);
    }
}

/// Tax rates applied to the taxable amount, as percentages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Taxes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cgst: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sgst: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub igst: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Partial update for [`Taxes`]
///
/// The outer `Option` means "leave unchanged"; `Some(None)` clears a rate.
#[derive(Debug, Clone, Default)]
pub struct TaxesPatch {
    pub cgst: Option<Option<f64>>,
    pub sgst: Option<Option<f64>>,
    pub igst: Option<Option<f64>>,
    pub notes: Option<Option<String>>,
}

impl Taxes {
    /// Apply a partial update
    pub fn apply(&mut self, patch: TaxesPatch) {
        if let Some(cgst) = patch.cgst {
            self.cgst = cgst;
        }
        if let Some(sgst) = patch.sgst {
            self.sgst = sgst;
        }
        if let Some(igst) = patch.igst {
            self.igst = igst;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes.filter(|n| !n.is_empty());
        }
    }
}

/// Company or client block on the invoice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    pub name: String,
    pub gst: String,
    pub address: String,
    pub phone: String,
    pub email: String,
}

/// Partial update for [`Party`]
#[derive(Debug, Clone, Default)]
pub struct PartyPatch {
    pub name: Option<String>,
    pub gst: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Party {
    /// Apply a partial update
    pub fn apply(&mut self, patch: PartyPatch) {
        let PartyPatch {
            name,
            gst,
            address,
            phone,
            email,
        } = patch;
        for (field, value) in [
            (&mut self.name, name),
            (&mut self.gst, gst),
            (&mut self.address, address),
            (&mut self.phone, phone),
            (&mut self.email, email),
        ] {
            if let Some(value) = value {
                *field = value;
            }
        }
    }
}

/// Invoice header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceMeta {
    pub number: String,
    /// Place of supply
    pub place: String,
    pub date: Option<NaiveDate>,
    pub due: Option<NaiveDate>,
}

/// Partial update for [`InvoiceMeta`]
#[derive(Debug, Clone, Default)]
pub struct InvoiceMetaPatch {
    pub number: Option<String>,
    pub place: Option<String>,
    pub date: Option<Option<NaiveDate>>,
    pub due: Option<Option<NaiveDate>>,
}

impl InvoiceMeta {
    /// Apply a partial update
    pub fn apply(&mut self, patch: InvoiceMetaPatch) {
        if let Some(number) = patch.number {
            self.number = number;
        }
        if let Some(place) = patch.place {
            self.place = place;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(due) = patch.due {
            self.due = due;
        }
    }
}

/// Diagonal text stamped across the invoice
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Watermark {
    pub text: String,
    pub enabled: bool,
}

impl Watermark {
    /// Only an enabled watermark with text is rendered
    pub fn is_visible(&self) -> bool {
        self.enabled && !self.text.trim().is_empty()
    }
}

/// Everything the user has entered for one invoice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceDraft {
    pub company: Party,
    pub client: Party,
    pub invoice: InvoiceMeta,
    pub taxes: Taxes,
    pub watermark: Watermark,
    pub items: Vec<InvoiceItem>,
}

/// Derived invoice totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceTotals {
    pub taxable: Money,
    pub cgst_amt: Money,
    pub sgst_amt: Money,
    pub igst_amt: Money,
    pub tax_total: Money,
    pub grand_total: Money,
    /// Grand total in words
    pub words: String,
}
