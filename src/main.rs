use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use gstbill_cli::cli::{
    handle_bank_command, handle_company_command, handle_export_command, handle_invoice_command,
    handle_product_command,
};
use gstbill_cli::config::{paths::GstBillPaths, settings::Settings};
use gstbill_cli::logging::init_cli_logger;
use gstbill_cli::storage::{JsonFileSource, Storage};

#[derive(Parser)]
#[command(
    name = "gstbill",
    version,
    about = "Terminal GST invoice builder",
    long_about = "gstbill builds GST invoices from a product catalog and saved bank and \
                  company details. Base datasets are read-only; local edits are kept \
                  as overrides alongside them."
)]
struct Cli {
    /// Data directory (defaults to the platform config directory)
    #[arg(long, global = true, env = "GSTBILL_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Product catalog commands
    #[command(subcommand, alias = "products")]
    Product(gstbill_cli::cli::ProductCommands),

    /// Bank details commands
    #[command(subcommand)]
    Bank(gstbill_cli::cli::BankCommands),

    /// Company details commands
    #[command(subcommand)]
    Company(gstbill_cli::cli::CompanyCommands),

    /// Invoice draft commands
    #[command(subcommand, alias = "inv")]
    Invoice(gstbill_cli::cli::InvoiceCommands),

    /// Export commands
    #[command(subcommand)]
    Export(gstbill_cli::cli::ExportCommands),

    /// Initialize the data directory
    Init {
        /// Directory holding products.json, bankdetails.json and companydetails.json
        #[arg(long)]
        dataset_dir: Option<PathBuf>,
        /// Default CGST percentage for new invoices
        #[arg(long)]
        cgst: Option<f64>,
        /// Default SGST percentage for new invoices
        #[arg(long)]
        sgst: Option<f64>,
        /// Default IGST percentage for new invoices
        #[arg(long)]
        igst: Option<f64>,
    },

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_cli_logger(cli.verbose);

    // Initialize paths and settings
    let paths = match cli.data_dir {
        Some(dir) => GstBillPaths::with_base_dir(dir),
        None => GstBillPaths::new()?,
    };
    let mut settings = Settings::load_or_create(&paths)?;

    // Initialize storage
    let storage = Storage::new(paths.clone())?;
    let source = JsonFileSource::new(settings.dataset_dir(&paths));
    storage.load_all(&source)?;

    match cli.command {
        Some(Commands::Product(cmd)) => handle_product_command(&storage, &settings, cmd)?,
        Some(Commands::Bank(cmd)) => handle_bank_command(&storage, cmd)?,
        Some(Commands::Company(cmd)) => handle_company_command(&storage, cmd)?,
        Some(Commands::Invoice(cmd)) => handle_invoice_command(&storage, &settings, cmd)?,
        Some(Commands::Export(cmd)) => handle_export_command(&storage, cmd)?,
        Some(Commands::Init {
            dataset_dir,
            cgst,
            sgst,
            igst,
        }) => {
            println!("Initializing gstbill at: {}", paths.base_dir().display());
            if dataset_dir.is_some() {
                settings.dataset_dir = dataset_dir;
            }
            for (field, value) in [
                (&mut settings.default_cgst, cgst),
                (&mut settings.default_sgst, sgst),
                (&mut settings.default_igst, igst),
            ] {
                if value.is_some() {
                    *field = value;
                }
            }

            let dataset_dir = settings.dataset_dir(&paths);
            std::fs::create_dir_all(&dataset_dir)?;
            settings.save(&paths)?;

            println!("Initialization complete!");
            println!();
            println!("Place base datasets in: {}", dataset_dir.display());
            println!("  - products.json");
            println!("  - bankdetails.json");
            println!("  - companydetails.json");
        }
        Some(Commands::Config) => {
            println!("gstbill Configuration");
            println!("=====================");
            println!("Base directory:    {}", paths.base_dir().display());
            println!("Data directory:    {}", paths.data_dir().display());
            println!("Dataset directory: {}", settings.dataset_dir(&paths).display());
            println!("Initialized:       {}", paths.is_initialized());
            println!();
            println!("Settings:");
            println!("  Currency symbol: {}", settings.currency_symbol);
            println!("  Date format:     {}", settings.date_format);
            println!("  Default CGST:    {}", rate(settings.default_cgst));
            println!("  Default SGST:    {}", rate(settings.default_sgst));
            println!("  Default IGST:    {}", rate(settings.default_igst));
        }
        None => {
            println!("gstbill - Terminal GST invoice builder");
            println!();
            println!("Run 'gstbill --help' for usage information.");
            println!("Run 'gstbill invoice new' to start an invoice.");
        }
    }

    Ok(())
}

fn rate(value: Option<f64>) -> String {
    value
        .map(|r| format!("{}%", r))
        .unwrap_or_else(|| "-".to_string())
}
