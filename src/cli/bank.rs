//! Bank details CLI commands

use clap::Subcommand;

use crate::display::format_bank;
use crate::error::GstBillResult;
use crate::services::CatalogService;
use crate::storage::Storage;

use super::{non_empty, persisted};

/// Bank subcommands
#[derive(Subcommand)]
pub enum BankCommands {
    /// Show the effective bank details
    Show,
    /// Replace the bank details with a local override
    ///
    /// Fields not given are carried over from the current details; pass an
    /// empty string to clear one.
    Set {
        #[arg(long)]
        bank_name: Option<String>,
        #[arg(long)]
        account_no: Option<String>,
        #[arg(long)]
        pan: Option<String>,
        /// Branch name and IFSC code, e.g. "Kochi HDFC0001234"
        #[arg(long)]
        branch_ifsc: Option<String>,
    },
    /// Drop the local override and use the base dataset again
    Reset,
}

/// Handle a bank command
pub fn handle_bank_command(storage: &Storage, cmd: BankCommands) -> GstBillResult<()> {
    let service = CatalogService::new(storage);

    match cmd {
        BankCommands::Show => {
            print!(
                "{}",
                format_bank(&service.bank()?, storage.bank.has_override()?)
            );
        }

        BankCommands::Set {
            bank_name,
            account_no,
            pan,
            branch_ifsc,
        } => {
            let mut bank = service.bank()?;
            for (field, value) in [
                (&mut bank.bank_name, bank_name),
                (&mut bank.account_no, account_no),
                (&mut bank.pan, pan),
                (&mut bank.branch_ifsc, branch_ifsc),
            ] {
                if let Some(value) = value {
                    *field = non_empty(value);
                }
            }

            if persisted(service.save_bank(bank.clone()))?.is_some() {
                println!("Bank details saved.");
            }
            print!("{}", format_bank(&bank, true));
        }

        BankCommands::Reset => {
            if persisted(service.reset_bank())?.is_some() {
                println!("Bank details reset to the base dataset.");
            }
        }
    }

    Ok(())
}
