//! Invoice CLI commands
//!
//! Every command loads the saved draft (or starts one), applies the edit,
//! and saves it again, so an invoice can be built up over several calls.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::config::settings::Settings;
use crate::display::{format_invoice, format_totals, InvoiceFormat};
use crate::error::{GstBillError, GstBillResult};
use crate::export::{export_invoice_json, export_items_csv};
use crate::models::{InvoiceMetaPatch, PartyPatch, TaxesPatch};
use crate::services::{CatalogService, InvoiceDraftSession, WatermarkPatch};
use crate::storage::Storage;

use super::parse_money;

/// Invoice export formats
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InvoiceExportFormat {
    /// Full invoice with totals
    Json,
    /// Line items and totals
    Csv,
}

/// Company or client fields
#[derive(Args, Debug, Default)]
pub struct PartyArgs {
    #[arg(long)]
    pub name: Option<String>,
    /// GSTIN
    #[arg(long)]
    pub gst: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

impl From<PartyArgs> for PartyPatch {
    fn from(args: PartyArgs) -> Self {
        Self {
            name: args.name,
            gst: args.gst,
            address: args.address,
            phone: args.phone,
            email: args.email,
        }
    }
}

/// Invoice subcommands
#[derive(Subcommand)]
pub enum InvoiceCommands {
    /// Start a new invoice draft
    New {
        /// Replace an existing draft
        #[arg(short, long)]
        force: bool,
    },
    /// Show the current invoice
    Show,
    /// Set the company (seller) block
    Company {
        #[command(flatten)]
        party: PartyArgs,
        /// Fill empty fields from the saved company details
        #[arg(long)]
        from_saved: bool,
    },
    /// Set the client (buyer) block
    Client {
        #[command(flatten)]
        party: PartyArgs,
    },
    /// Set invoice number, place of supply and dates
    Meta {
        #[arg(long)]
        number: Option<String>,
        /// Place of supply
        #[arg(long)]
        place: Option<String>,
        /// Invoice date (YYYY-MM-DD, empty to clear)
        #[arg(long)]
        date: Option<String>,
        /// Due date (YYYY-MM-DD, empty to clear)
        #[arg(long)]
        due: Option<String>,
    },
    /// Set tax rates in percent (empty to clear)
    Tax {
        #[arg(long)]
        cgst: Option<String>,
        #[arg(long)]
        sgst: Option<String>,
        #[arg(long)]
        igst: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Configure the watermark
    Watermark {
        #[arg(long)]
        text: Option<String>,
        #[arg(long, conflicts_with = "disable")]
        enable: bool,
        #[arg(long)]
        disable: bool,
    },
    /// Add a line item
    Add {
        /// Fill the line from a product (ID or name)
        #[arg(short, long)]
        product: Option<String>,
        /// Quantity
        #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
        qty: f64,
        /// Description (for lines not taken from a product)
        #[arg(short, long)]
        name: Option<String>,
        /// Unit rate in rupees
        #[arg(short, long, allow_negative_numbers = true)]
        rate: Option<String>,
        /// HSN/SAC code
        #[arg(long)]
        hsn: Option<String>,
    },
    /// Edit a line item
    Edit {
        /// Line number (as shown) or item ID
        item: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long, allow_negative_numbers = true)]
        rate: Option<String>,
        #[arg(short, long, allow_negative_numbers = true)]
        qty: Option<f64>,
        /// HSN/SAC code (empty to clear)
        #[arg(long)]
        hsn: Option<String>,
        /// Refill name and rate from a product (ID or name)
        #[arg(short, long)]
        product: Option<String>,
    },
    /// Remove a line item
    Remove {
        /// Line number (as shown) or item ID
        item: String,
    },
    /// Show the tax breakdown and grand total
    Totals,
    /// Export the invoice
    Export {
        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: InvoiceExportFormat,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Throw the saved draft away
    Discard,
}

/// Handle an invoice command
pub fn handle_invoice_command(
    storage: &Storage,
    settings: &Settings,
    cmd: InvoiceCommands,
) -> GstBillResult<()> {
    let layout = InvoiceFormat {
        currency_symbol: &settings.currency_symbol,
        date_format: &settings.date_format,
    };

    match cmd {
        InvoiceCommands::New { force } => {
            if storage.draft.exists() && !force {
                println!("A draft invoice already exists.");
                println!("Use --force to start over, or 'invoice show' to view it");
                return Ok(());
            }

            let mut session = InvoiceDraftSession::from_settings(settings);
            session.prefill_company(&storage.company.get()?);
            session.save(&storage.draft)?;
            println!("Started a new invoice.");
        }

        InvoiceCommands::Show => {
            let session = InvoiceDraftSession::resume(&storage.draft, settings)?;
            print!(
                "{}",
                format_invoice(session.draft(), &storage.bank.get()?, &layout)
            );
        }

        InvoiceCommands::Company { party, from_saved } => {
            edit_draft(storage, settings, |session| {
                session.set_company(party.into());
                if from_saved {
                    session.prefill_company(&storage.company.get()?);
                }
                Ok(())
            })?;
            println!("Company updated.");
        }

        InvoiceCommands::Client { party } => {
            edit_draft(storage, settings, |session| {
                session.set_client(party.into());
                Ok(())
            })?;
            println!("Client updated.");
        }

        InvoiceCommands::Meta {
            number,
            place,
            date,
            due,
        } => {
            let patch = InvoiceMetaPatch {
                number,
                place,
                date: date.as_deref().map(parse_date).transpose()?,
                due: due.as_deref().map(parse_date).transpose()?,
            };
            edit_draft(storage, settings, |session| {
                session.set_invoice(patch);
                Ok(())
            })?;
            println!("Invoice details updated.");
        }

        InvoiceCommands::Tax {
            cgst,
            sgst,
            igst,
            notes,
        } => {
            let patch = TaxesPatch {
                cgst: cgst.as_deref().map(parse_rate).transpose()?,
                sgst: sgst.as_deref().map(parse_rate).transpose()?,
                igst: igst.as_deref().map(parse_rate).transpose()?,
                notes: notes.map(|n| Some(n).filter(|n| !n.is_empty())),
            };
            let session = edit_draft(storage, settings, |session| {
                session.set_taxes(patch);
                Ok(())
            })?;
            print!(
                "{}",
                format_totals(session.taxes(), &session.totals(), &settings.currency_symbol)
            );
        }

        InvoiceCommands::Watermark {
            text,
            enable,
            disable,
        } => {
            let enabled = match (enable, disable) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            let session = edit_draft(storage, settings, |session| {
                session.set_watermark(WatermarkPatch { text, enabled });
                Ok(())
            })?;
            let mark = &session.draft().watermark;
            println!(
                "Watermark: '{}' ({})",
                mark.text,
                if mark.is_visible() { "shown" } else { "hidden" }
            );
        }

        InvoiceCommands::Add {
            product,
            qty,
            name,
            rate,
            hsn,
        } => {
            let rate = rate.as_deref().map(parse_money).transpose()?;
            let product_id = product
                .as_deref()
                .map(|p| resolve_product(storage, p))
                .transpose()?;

            let session = edit_draft(storage, settings, |session| {
                let id = match &product_id {
                    Some(product_id) => session.add_product(product_id, qty, &storage.products)?,
                    None => {
                        let id = session.add_item();
                        session.set_item_qty(&id, qty)?;
                        id
                    }
                };
                if let Some(name) = name {
                    session.set_item_name(&id, name)?;
                }
                if let Some(rate) = rate {
                    session.set_item_rate(&id, rate)?;
                }
                if hsn.is_some() {
                    session.set_item_hsn(&id, hsn)?;
                }
                Ok(())
            })?;

            if let Some(item) = session.items().last() {
                println!(
                    "Added line {}: {} x {} = {}",
                    session.items().len(),
                    item.name,
                    item.qty,
                    item.amount
                );
            }
        }

        InvoiceCommands::Edit {
            item,
            name,
            rate,
            qty,
            hsn,
            product,
        } => {
            let rate = rate.as_deref().map(parse_money).transpose()?;
            let product_id = product
                .as_deref()
                .map(|p| resolve_product(storage, p))
                .transpose()?;

            edit_draft(storage, settings, |session| {
                let id = resolve_item(session, &item)?;
                if let Some(product_id) = &product_id {
                    session.choose_product(&id, product_id, &storage.products)?;
                }
                if let Some(name) = name {
                    session.set_item_name(&id, name)?;
                }
                if let Some(rate) = rate {
                    session.set_item_rate(&id, rate)?;
                }
                if let Some(qty) = qty {
                    session.set_item_qty(&id, qty)?;
                }
                if let Some(hsn) = hsn {
                    session.set_item_hsn(&id, Some(hsn))?;
                }
                Ok(())
            })?;
            println!("Line updated.");
        }

        InvoiceCommands::Remove { item } => {
            edit_draft(storage, settings, |session| {
                let id = resolve_item(session, &item)?;
                session.remove_item(&id);
                Ok(())
            })?;
            println!("Line removed.");
        }

        InvoiceCommands::Totals => {
            let session = InvoiceDraftSession::resume(&storage.draft, settings)?;
            let totals = session.totals();
            print!(
                "{}",
                format_totals(session.taxes(), &totals, &settings.currency_symbol)
            );
            println!("\n{}", totals.words);
        }

        InvoiceCommands::Export {
            format,
            output,
            pretty,
        } => {
            let session = InvoiceDraftSession::resume(&storage.draft, settings)?;
            let bank = storage.bank.get()?;

            let mut writer: Box<dyn Write> = match &output {
                Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| {
                    GstBillError::Export(format!("Failed to create {}: {}", path.display(), e))
                })?)),
                None => Box::new(std::io::stdout().lock()),
            };

            match format {
                InvoiceExportFormat::Json => {
                    export_invoice_json(session.draft(), bank, &mut writer, pretty)?
                }
                InvoiceExportFormat::Csv => export_items_csv(session.draft(), &mut writer)?,
            }
            writer
                .flush()
                .map_err(|e| GstBillError::Export(e.to_string()))?;

            if let Some(path) = output {
                eprintln!("Exported invoice to {}", path.display());
            }
        }

        InvoiceCommands::Discard => {
            storage.draft.discard()?;
            println!("Draft discarded.");
        }
    }

    Ok(())
}

/// Load the draft, apply `edit`, and save it back
fn edit_draft(
    storage: &Storage,
    settings: &Settings,
    edit: impl FnOnce(&mut InvoiceDraftSession) -> GstBillResult<()>,
) -> GstBillResult<InvoiceDraftSession> {
    let mut session = InvoiceDraftSession::resume(&storage.draft, settings)?;
    edit(&mut session)?;
    session.save(&storage.draft)?;
    Ok(session)
}

/// Accept a 1-based line number or an item id
fn resolve_item(session: &InvoiceDraftSession, item: &str) -> GstBillResult<String> {
    let items = session.items();
    if let Ok(line) = item.parse::<usize>() {
        if line >= 1 && line <= items.len() {
            return Ok(items[line - 1].id.clone());
        }
    }
    items
        .iter()
        .find(|i| i.id == item)
        .map(|i| i.id.clone())
        .ok_or_else(|| GstBillError::item_not_found(item))
}

fn resolve_product(storage: &Storage, product: &str) -> GstBillResult<String> {
    CatalogService::new(storage)
        .find_product(product)?
        .map(|p| p.id)
        .ok_or_else(|| GstBillError::product_not_found(product))
}

/// Parse `YYYY-MM-DD`; an empty string clears the date
fn parse_date(s: &str) -> GstBillResult<Option<NaiveDate>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| GstBillError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", s)))
}

/// Parse a percentage; an empty string clears the rate
fn parse_rate(s: &str) -> GstBillResult<Option<f64>> {
    let s = s.trim().trim_end_matches('%');
    if s.is_empty() {
        return Ok(None);
    }
    s.parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
        .map(Some)
        .ok_or_else(|| GstBillError::Validation(format!("Invalid tax rate '{}'", s)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(parse_date("2024-04-01").unwrap(), NaiveDate::from_ymd_opt(2024, 4, 1));
        assert_eq!(parse_date("").unwrap(), None);
        assert!(parse_date("01/04/2024").unwrap_err().is_validation());
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(parse_rate("9").unwrap(), Some(9.0));
        assert_eq!(parse_rate("2.5%").unwrap(), Some(2.5));
        assert_eq!(parse_rate(" ").unwrap(), None);
        assert!(parse_rate("nine").is_err());
    }

    #[test]
    fn test_resolve_item_by_line_or_id() {
        let mut session = InvoiceDraftSession::new();
        let first = session.add_item();
        let second = session.add_item();

        assert_eq!(resolve_item(&session, "1").unwrap(), first);
        assert_eq!(resolve_item(&session, &second).unwrap(), second);
        assert!(resolve_item(&session, "3").unwrap_err().is_not_found());
    }
}
