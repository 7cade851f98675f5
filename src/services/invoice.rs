//! Invoice calculation
//!
//! Derives taxable value, per-component GST, and the grand total from line
//! items and tax rates. Inputs are not validated: negative quantities or
//! rates simply produce negative amounts.

use crate::display::words::to_sentence;
use crate::models::{InvoiceItem, InvoiceTotals, Money, Taxes};

/// A tax component with a non-zero rate, as shown on the invoice
#[derive(Debug, Clone, PartialEq)]
pub struct TaxLine {
    pub label: &'static str,
    pub rate: f64,
    pub amount: Money,
}

/// Computes invoice totals
pub struct InvoiceCalculator;

impl InvoiceCalculator {
    /// Compute totals for a set of items under the given tax rates
    ///
    /// Every intermediate amount is rounded to the paisa before it is
    /// summed, so totals always add up to what is displayed.
    ///
    /// # Examples
    /// ```
    /// use gstbill_cli::models::{InvoiceItem, Money, Taxes};
    /// use gstbill_cli::services::InvoiceCalculator;
    ///
    /// let items = vec![
    ///     InvoiceItem::new("Tea", Money::from_rupees(100.0), 1.0),
    ///     InvoiceItem::new("Coffee", Money::from_rupees(50.0), 1.0),
    /// ];
    /// let taxes = Taxes { cgst: Some(9.0), sgst: Some(9.0), ..Default::default() };
    ///
    /// let totals = InvoiceCalculator::calculate(&items, &taxes);
    /// assert_eq!(totals.grand_total, Money::from_rupees(177.0));
    /// ```
    pub fn calculate(items: &[InvoiceItem], taxes: &Taxes) -> InvoiceTotals {
        let taxable: Money = items.iter().map(|item| item.amount).sum();

        let component = |rate: Option<f64>| taxable.percent(rate.unwrap_or(0.0));
        let cgst_amt = component(taxes.cgst);
        let sgst_amt = component(taxes.sgst);
        let igst_amt = component(taxes.igst);

        let tax_total = cgst_amt + sgst_amt + igst_amt;
        let grand_total = taxable + tax_total;

        tracing::debug!(
            items = items.len(),
            taxable = %taxable,
            tax_total = %tax_total,
            grand_total = %grand_total,
            "calculated invoice totals"
        );

        InvoiceTotals {
            taxable,
            cgst_amt,
            sgst_amt,
            igst_amt,
            tax_total,
            grand_total,
            words: to_sentence(grand_total),
        }
    }

    /// The tax components to show, skipping those with a zero or absent rate
    pub fn tax_lines(taxes: &Taxes, totals: &InvoiceTotals) -> Vec<TaxLine> {
        [
            ("CGST", taxes.cgst, totals.cgst_amt),
            ("SGST", taxes.sgst, totals.sgst_amt),
            ("IGST", taxes.igst, totals.igst_amt),
        ]
        .into_iter()
        .filter_map(|(label, rate, amount)| match rate {
            Some(rate) if rate != 0.0 => Some(TaxLine {
                label,
                rate,
                amount,
            }),
            _ => None,
        })
        .collect()
    }
}
