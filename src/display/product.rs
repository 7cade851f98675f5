//! Product display formatting

use tabled::{settings::Style, Table, Tabled};

use crate::models::{BankDetails, CompanyDetails, Product};

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "")]
    marker: &'static str,
}

/// Format a list of products as a table
///
/// `is_local` marks products that carry a local edit.
pub fn format_product_list(products: &[Product], is_local: impl Fn(&Product) -> bool) -> String {
    if products.is_empty() {
        return "No products found.".to_string();
    }

    let rows = products.iter().map(|p| ProductRow {
        id: p.id.clone(),
        name: p.to_string(),
        category: p.category.clone().unwrap_or_default(),
        price: p.price.to_string(),
        marker: if is_local(p) { "*" } else { "" },
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n\nTotal: {} products\n", table, products.len())
}

/// Format a single product
pub fn format_product_details(product: &Product, symbol: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("Product:  {}\n", product.name));
    output.push_str(&format!("ID:       {}\n", product.id));
    output.push_str(&format!("Price:    {}\n", product.price.format_with_symbol(symbol)));
    if let Some(category) = &product.category {
        output.push_str(&format!("Category: {}\n", category));
    }
    if let Some(variant) = &product.variant {
        output.push_str(&format!("Variant:  {}\n", variant));
    }
    output
}

pub fn format_bank(bank: &BankDetails, overridden: bool) -> String {
    format_fields(
        &[
            ("Bank Name", &bank.bank_name),
            ("Account No", &bank.account_no),
            ("PAN", &bank.pan),
            ("Branch & IFSC", &bank.branch_ifsc),
        ],
        overridden,
    )
}

pub fn format_company(company: &CompanyDetails, overridden: bool) -> String {
    format_fields(
        &[
            ("Name", &company.name),
            ("GSTIN", &company.gst),
            ("Address", &company.address),
            ("Phone", &company.phone),
            ("Email", &company.email),
        ],
        overridden,
    )
}

fn format_fields(fields: &[(&str, &Option<String>)], overridden: bool) -> String {
    let mut output = String::new();
    for (label, value) in fields {
        output.push_str(&format!(
            "{:<14} {}\n",
            format!("{}:", label),
            value.as_deref().unwrap_or("-")
        ));
    }
    output.push_str(if overridden {
        "\n(local override)\n"
    } else {
        "\n(base dataset)\n"
    });
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Money;

    #[test]
    fn test_empty_list() {
        assert_eq!(format_product_list(&[], |_| false), "No products found.");
    }

    #[test]
    fn test_product_table() {
        let products = vec![
            Product::with_id("t1", "Masala Tea", Money::from_rupees(120.0)).in_category("Tea"),
            Product::with_id("c1", "Coffee", Money::from_rupees(80.5)).with_variant("Large"),
        ];
        let output = format_product_list(&products, |p| p.id == "c1");

        assert!(output.contains("Masala Tea"));
        assert!(output.contains("Coffee (Large)"));
        assert!(output.contains("80.50"));
        assert!(output.contains("Total: 2 products"));
    }

    #[test]
    fn test_details_blocks() {
        let company = CompanyDetails {
            name: Some("Nilgiri Traders".into()),
            ..Default::default()
        };
        let output = format_company(&company, true);
        assert!(output.contains("Name:          Nilgiri Traders"));
        assert!(output.contains("GSTIN:         -"));
        assert!(output.contains("(local override)"));

        assert!(format_bank(&BankDetails::default(), false).contains("(base dataset)"));
    }
}
