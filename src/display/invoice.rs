//! Invoice display formatting
//!
//! Renders an invoice draft as plain text for the terminal: header,
//! parties, line items, tax breakdown, amount in words, and bank details.

use chrono::NaiveDate;

use crate::models::{BankDetails, InvoiceDraft, InvoiceItem, InvoiceTotals, Party, Taxes};
use crate::services::InvoiceCalculator;

use super::words::to_title_words;

const WIDTH: usize = 72;

/// Formatting preferences for rendered invoices
#[derive(Debug, Clone)]
pub struct InvoiceFormat<'a> {
    pub currency_symbol: &'a str,
    pub date_format: &'a str,
}

impl Default for InvoiceFormat<'_> {
    fn default() -> Self {
        Self {
            currency_symbol: "₹",
            date_format: "%d-%m-%Y",
        }
    }
}

/// Render the full invoice
pub fn format_invoice(draft: &InvoiceDraft, bank: &BankDetails, fmt: &InvoiceFormat) -> String {
    let totals = InvoiceCalculator::calculate(&draft.items, &draft.taxes);
    let mut output = String::new();

    output.push_str(&format!("{:^WIDTH$}\n", "TAX INVOICE"));
    if draft.watermark.is_visible() {
        output.push_str(&format!(
            "{:^WIDTH$}\n",
            format!("*** {} ***", draft.watermark.text.trim().to_uppercase())
        ));
    }
    output.push_str(&format!("{}\n", "=".repeat(WIDTH)));

    let company_name = if draft.company.name.trim().is_empty() {
        "Company Name"
    } else {
        draft.company.name.as_str()
    };
    output.push_str(&format!("{}\n", company_name));
    push_party_details(&mut output, &draft.company, "GSTIN:", true);
    output.push('\n');

    let meta = &draft.invoice;
    push_row(&mut output, "Invoice No.", &meta.number);
    push_row(&mut output, "Place", &meta.place);
    push_row(&mut output, "Invoice Date", &format_date(meta.date, fmt.date_format));
    push_row(&mut output, "Due Date", &format_date(meta.due, fmt.date_format));
    output.push_str(&format!("{}\n", "-".repeat(WIDTH)));

    output.push_str("Buyer (Bill to)\n");
    if !draft.client.name.is_empty() {
        output.push_str(&format!("{}\n", draft.client.name));
    }
    push_party_details(&mut output, &draft.client, "GSTIN", false);
    output.push_str(&format!("{}\n", "-".repeat(WIDTH)));

    output.push_str(&format_items(&draft.items, &totals));
    output.push('\n');

    if let Some(notes) = draft.taxes.notes.as_deref() {
        output.push_str(&format!("Notes: {}\n\n", notes));
    }

    output.push_str(&format_totals(&draft.taxes, &totals, fmt.currency_symbol));
    output.push('\n');
    output.push_str(&format!(
        "Amount Chargeable (in words): {}\n",
        to_title_words(totals.grand_total)
    ));
    output.push_str(&format!("Tax Amount (in words): {}\n", totals.words));
    output.push('\n');

    output.push_str(&format_bank_details(bank));
    output.push('\n');
    output.push_str(&format!("{:>WIDTH$}\n", "Authorised Signatory"));

    output
}

/// Render the line items table with its taxable total
pub fn format_items(items: &[InvoiceItem], totals: &InvoiceTotals) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "{:<4} {:<34} {:>8} {:>10} {:>12}\n",
        "Sl", "Description of Goods", "Qty", "Rate", "Amount"
    ));

    if items.is_empty() {
        output.push_str(&format!("{:^WIDTH$}\n", "No items"));
    }

    for (idx, item) in items.iter().enumerate() {
        let description = match item.hsn.as_deref() {
            Some(hsn) => format!("{} [HSN {}]", item.name, hsn),
            None => item.name.clone(),
        };
        output.push_str(&format!(
            "{:<4} {:<34} {:>8} {:>10} {:>12}\n",
            idx + 1,
            truncate(&description, 34),
            item.qty,
            item.rate.to_string(),
            item.amount.to_string()
        ));
    }

    output.push_str(&format!("{:>58} {:>12}\n", "Total", totals.taxable.to_string()));
    output
}

/// Render the tax breakdown and grand total
///
/// A tax line is only shown when its rate is non-zero.
pub fn format_totals(taxes: &Taxes, totals: &InvoiceTotals, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{:<20} {:>16}\n",
        "Taxable Value",
        totals.taxable.format_with_symbol(symbol)
    ));
    for line in InvoiceCalculator::tax_lines(taxes, totals) {
        output.push_str(&format!(
            "{:<20} {:>16}\n",
            format!("{} {}%", line.label, line.rate),
            line.amount.format_with_symbol(symbol)
        ));
    }
    output.push_str(&format!(
        "{:<20} {:>16}\n",
        "Tax Total",
        totals.tax_total.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "{:<20} {:>16}\n",
        "Grand Total",
        totals.grand_total.format_with_symbol(symbol)
    ));

    output
}

/// Render the company's bank block
pub fn format_bank_details(bank: &BankDetails) -> String {
    let field = |value: &Option<String>| value.clone().unwrap_or_default();

    let mut output = String::new();
    output.push_str("Company's Bank Details\n");
    output.push_str(&format!("  Bank Name:     {}\n", field(&bank.bank_name)));
    output.push_str(&format!("  A/c No:        {}\n", field(&bank.account_no)));
    output.push_str(&format!("  Company's PAN: {}\n", field(&bank.pan)));
    output.push_str(&format!("  Branch & IFSC: {}\n", field(&bank.branch_ifsc)));
    output
}

fn push_party_details(output: &mut String, party: &Party, gst_label: &str, always: bool) {
    if !party.address.is_empty() {
        output.push_str(&format!("{}\n", party.address));
    }
    for (label, value) in [
        (gst_label, &party.gst),
        ("Phone:", &party.phone),
        ("Email:", &party.email),
    ] {
        if always || !value.is_empty() {
            push_row(output, label, value);
        }
    }
}

fn push_row(output: &mut String, label: &str, value: &str) {
    output.push_str(&format!("{:<14} {}\n", label, value));
}

fn format_date(date: Option<NaiveDate>, format: &str) -> String {
    date.map(|d| d.format(format).to_string()).unwrap_or_default()
}

/// Truncate a string to a maximum number of characters
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
