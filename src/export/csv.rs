//! CSV export
//!
//! Invoice line items and the product catalog in spreadsheet-friendly
//! form. Amounts are written as plain decimals without a currency symbol.

use std::io::Write;

use crate::error::{GstBillError, GstBillResult};
use crate::models::{InvoiceDraft, Product};
use crate::services::InvoiceCalculator;

/// Write the line items of an invoice, followed by a totals block
pub fn export_items_csv<W: Write>(draft: &InvoiceDraft, writer: &mut W) -> GstBillResult<()> {
    let totals = InvoiceCalculator::calculate(&draft.items, &draft.taxes);
    let mut out = ::csv::Writer::from_writer(writer);

    out.write_record(["Sl", "Description", "HSN", "Qty", "Rate", "Amount"])?;
    for (idx, item) in draft.items.iter().enumerate() {
        out.write_record([
            (idx + 1).to_string(),
            item.name.clone(),
            item.hsn.clone().unwrap_or_default(),
            item.qty.to_string(),
            item.rate.to_string(),
            item.amount.to_string(),
        ])?;
    }

    let mut summary = vec![("Taxable", totals.taxable.to_string())];
    for line in InvoiceCalculator::tax_lines(&draft.taxes, &totals) {
        summary.push((line.label, line.amount.to_string()));
    }
    summary.push(("Tax Total", totals.tax_total.to_string()));
    summary.push(("Grand Total", totals.grand_total.to_string()));

    for (label, value) in summary {
        out.write_record(["", label, "", "", "", value.as_str()])?;
    }

    out.flush()
        .map_err(|e| GstBillError::Export(e.to_string()))?;
    Ok(())
}

/// Write products as CSV
pub fn export_products_csv<W: Write>(products: &[Product], writer: &mut W) -> GstBillResult<()> {
    let mut out = ::csv::Writer::from_writer(writer);

    out.write_record(["ID", "Name", "Price", "Category", "Variant"])?;
    for product in products {
        out.write_record([
            product.id.as_str(),
            product.name.as_str(),
            product.price.to_string().as_str(),
            product.category.as_deref().unwrap_or_default(),
            product.variant.as_deref().unwrap_or_default(),
        ])?;
    }

    out.flush()
        .map_err(|e| GstBillError::Export(e.to_string()))?;
    Ok(())
}
