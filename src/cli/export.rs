//! CLI commands for catalog export

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use clap::{Subcommand, ValueEnum};

use crate::error::{GstBillError, GstBillResult};
use crate::export::{export_catalog_json, export_products_csv};
use crate::storage::Storage;

/// Export format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    /// CSV format (products only)
    Csv,
    /// JSON format (products, bank and company details)
    Json,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export the effective catalog
    Catalog {
        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Export format
        #[arg(short, long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },
}

/// Handle export commands
pub fn handle_export_command(storage: &Storage, cmd: ExportCommands) -> GstBillResult<()> {
    match cmd {
        ExportCommands::Catalog {
            output,
            format,
            pretty,
        } => {
            let mut writer: Box<dyn Write> = match &output {
                Some(path) => {
                    let file = File::create(path).map_err(|e| {
                        GstBillError::Export(format!(
                            "Failed to create file {}: {}",
                            path.display(),
                            e
                        ))
                    })?;
                    Box::new(BufWriter::new(file))
                }
                None => Box::new(std::io::stdout().lock()),
            };

            match format {
                ExportFormat::Json => export_catalog_json(storage, &mut writer, pretty)?,
                ExportFormat::Csv => export_products_csv(&storage.products.list()?, &mut writer)?,
            }
            writer
                .flush()
                .map_err(|e| GstBillError::Export(e.to_string()))?;

            if let Some(path) = output {
                eprintln!("Catalog exported to: {}", path.display());
            }
        }
    }

    Ok(())
}
