//! Company details CLI commands

use clap::Subcommand;

use crate::display::format_company;
use crate::error::GstBillResult;
use crate::services::CatalogService;
use crate::storage::Storage;

use super::{non_empty, persisted};

/// Company subcommands
#[derive(Subcommand)]
pub enum CompanyCommands {
    /// Show the effective company details
    Show,
    /// Replace the company details with a local override
    ///
    /// Fields not given are carried over from the current details; pass an
    /// empty string to clear one.
    Set {
        #[arg(long)]
        name: Option<String>,
        /// GSTIN
        #[arg(long)]
        gst: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Drop the local override and use the base dataset again
    Reset,
}

/// Handle a company command
pub fn handle_company_command(storage: &Storage, cmd: CompanyCommands) -> GstBillResult<()> {
    let service = CatalogService::new(storage);

    match cmd {
        CompanyCommands::Show => {
            print!(
                "{}",
                format_company(&service.company()?, storage.company.has_override()?)
            );
        }

        CompanyCommands::Set {
            name,
            gst,
            address,
            phone,
            email,
        } => {
            let mut company = service.company()?;
            for (field, value) in [
                (&mut company.name, name),
                (&mut company.gst, gst),
                (&mut company.address, address),
                (&mut company.phone, phone),
                (&mut company.email, email),
            ] {
                if let Some(value) = value {
                    *field = non_empty(value);
                }
            }

            if persisted(service.save_company(company.clone()))?.is_some() {
                println!("Company details saved.");
            }
            print!("{}", format_company(&company, true));
        }

        CompanyCommands::Reset => {
            if persisted(service.reset_company())?.is_some() {
                println!("Company details reset to the base dataset.");
            }
        }
    }

    Ok(())
}
