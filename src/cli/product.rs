//! Product CLI commands
//!
//! Implements CLI commands for catalog management.

use clap::Subcommand;

use crate::config::settings::Settings;
use crate::display::{format_product_details, format_product_list};
use crate::error::{GstBillError, GstBillResult};
use crate::services::{CatalogService, ProductUpdate};
use crate::storage::Storage;

use super::{parse_money, persisted};

/// Product subcommands
#[derive(Subcommand)]
pub enum ProductCommands {
    /// List products in the effective catalog
    List {
        /// Search query to filter products
        #[arg(short, long)]
        search: Option<String>,
        /// Maximum number of products to show
        #[arg(short, long, default_value = "100")]
        limit: usize,
    },
    /// Show product details
    Show {
        /// Product ID or name
        product: String,
    },
    /// Add a product
    Add {
        /// Product name
        name: String,
        /// Unit price in rupees (e.g. 120.50)
        price: String,
        /// Explicit product ID (generated when omitted)
        #[arg(long)]
        id: Option<String>,
        /// Category
        #[arg(short, long)]
        category: Option<String>,
        /// Variant label
        #[arg(long)]
        variant: Option<String>,
    },
    /// Edit a product
    Edit {
        /// Product ID or name
        product: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New unit price in rupees
        #[arg(short, long)]
        price: Option<String>,
        /// New category (empty to clear)
        #[arg(short, long)]
        category: Option<String>,
        /// New variant (empty to clear)
        #[arg(long)]
        variant: Option<String>,
    },
    /// Delete a product
    Delete {
        /// Product ID or name
        product: String,
    },
    /// Discard all local product edits
    Reset {
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a product command
pub fn handle_product_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ProductCommands,
) -> GstBillResult<()> {
    let service = CatalogService::new(storage);

    match cmd {
        ProductCommands::List { search, limit } => {
            let products = match search {
                Some(query) => service.search_products(&query, limit)?,
                None => service.list_products()?.into_iter().take(limit).collect(),
            };

            let overrides = storage.products.overrides()?;
            print!(
                "{}",
                format_product_list(&products, |p| overrides.upsert_for(&p.id).is_some())
            );
            if !overrides.is_empty() {
                println!("* = edited locally");
            }
        }

        ProductCommands::Show { product } => {
            let p = service
                .find_product(&product)?
                .ok_or_else(|| GstBillError::product_not_found(&product))?;
            print!("{}", format_product_details(&p, &settings.currency_symbol));
        }

        ProductCommands::Add {
            name,
            price,
            id,
            category,
            variant,
        } => {
            let price = parse_money(&price)?;
            let created = persisted(service.create_product(
                id.as_deref(),
                &name,
                price,
                category,
                variant,
            ))?;
            if let Some(p) = created {
                println!("Added product: {} ({})", p, p.id);
            }
        }

        ProductCommands::Edit {
            product,
            name,
            price,
            category,
            variant,
        } => {
            let p = service
                .find_product(&product)?
                .ok_or_else(|| GstBillError::product_not_found(&product))?;

            let update = ProductUpdate {
                name,
                price: price.as_deref().map(parse_money).transpose()?,
                category: category.map(|c| Some(c).filter(|c| !c.is_empty())),
                variant: variant.map(|v| Some(v).filter(|v| !v.is_empty())),
            };
            if let Some(updated) = persisted(service.update_product(&p.id, update))? {
                println!("Updated product: {} ({})", updated, updated.price);
            }
        }

        ProductCommands::Delete { product } => {
            let p = service
                .find_product(&product)?
                .ok_or_else(|| GstBillError::product_not_found(&product))?;
            if let Some(deleted) = persisted(service.delete_product(&p.id))? {
                println!("Deleted product: {}", deleted);
            }
        }

        ProductCommands::Reset { force } => {
            let overrides = storage.products.overrides()?;
            if overrides.is_empty() {
                println!("No local product edits.");
                return Ok(());
            }

            if !force {
                println!(
                    "About to discard {} edited and {} deleted products",
                    overrides.upserts().len(),
                    overrides.deleted_ids().len()
                );
                println!("Use --force to confirm");
                return Ok(());
            }

            if persisted(service.reset_products())?.is_some() {
                println!("Local product edits discarded.");
            }
        }
    }

    Ok(())
}
