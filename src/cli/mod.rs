pub mod entry;
pub mod export;
pub mod import;
pub mod init;
pub mod list;
pub mod report;

use clap::{Parser, Subcommand};
use rusqlite::Connection;

use crate::db::open_ledger;
use crate::error::{CaixaError, Result};
use crate::models::{PaymentMethod, ALL_PAYMENT_METHODS};
use crate::settings::get_data_dir;

pub(crate) fn open_default_ledger() -> Result<Connection> {
    open_ledger(&get_data_dir())
}

/// Accepts either a stored key (`pix`, `cash`, ...) or free text run through
/// the same rules the importer uses (`dinheiro`, `cartão de débito`, ...).
pub(crate) fn parse_method_arg(raw: &str) -> Result<PaymentMethod> {
    if let Some(m) = PaymentMethod::from_key(&raw.to_lowercase()) {
        return Ok(m);
    }
    match crate::parsers::parse_payment_method(&raw.into()) {
        PaymentMethod::Other if !raw.trim().eq_ignore_ascii_case("outros") => {
            let keys: Vec<&str> = ALL_PAYMENT_METHODS.iter().map(|m| m.key()).collect();
            Err(CaixaError::InvalidInput(format!(
                "unknown payment method {raw:?} (expected one of: {})",
                keys.join(", ")
            )))
        }
        m => Ok(m),
    }
}

#[derive(Parser)]
#[command(name = "caixa", about = "Personal cash book: import spreadsheet exports into a local ledger.")]
pub struct Cli {
    /// Show per-row import diagnostics.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the ledger.
    Init {
        /// Path for caixa data (default: ~/Documents/caixa)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Import a spreadsheet (xlsx/xls/ods) or CSV export.
    Import {
        /// Path to the file to import
        file: String,
        /// Print the parsed transactions
        #[arg(long)]
        preview: bool,
        /// Parse and report without saving anything
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Import even if this file was imported before
        #[arg(long)]
        force: bool,
    },
    /// Record a transaction by hand.
    Add {
        /// Date: dd/mm/yyyy, yyyy-mm-dd or ddmmyyyy
        #[arg(long)]
        date: String,
        /// entrada / saída (anything else counts as an expense)
        #[arg(long)]
        kind: String,
        #[arg(long)]
        description: String,
        /// Amount, e.g. "1.234,56"
        #[arg(long)]
        amount: String,
        /// Payment method: debit, credit, pix, cash, pending, transfer, other
        #[arg(long, default_value = "other")]
        method: String,
        #[arg(long, default_value = "")]
        note: String,
    },
    /// List stored transactions.
    List {
        /// Start date (inclusive)
        #[arg(long = "from")]
        from_date: Option<String>,
        /// End date (inclusive)
        #[arg(long = "to")]
        to_date: Option<String>,
        /// Only this payment method
        #[arg(long)]
        method: Option<String>,
        /// Only entradas or saídas
        #[arg(long)]
        kind: Option<String>,
    },
    /// Change fields of a stored transaction.
    Edit {
        id: i64,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        kind: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        method: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete one or more transactions.
    Delete {
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Income, expenses and balance.
    Summary {
        /// Month filter: YYYY-MM
        #[arg(long)]
        month: Option<String>,
        /// Year filter: YYYY
        #[arg(long)]
        year: Option<i32>,
    },
    /// Month-by-month comparison of income and expenses.
    Monthly {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Income and expenses per calendar month, across every year on record.
    Totals,
    /// Export the ledger.
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
}

#[derive(Subcommand)]
pub enum ExportCommands {
    /// Write all transactions to a CSV file.
    Csv {
        /// Output path
        output: String,
    },
    /// Write a month-by-month PDF statement.
    #[cfg(feature = "pdf")]
    Pdf {
        #[arg(long)]
        year: Option<i32>,
        /// Output path (default: <data_dir>/exports/extrato-YYYY-MM-DD.pdf)
        #[arg(long)]
        output: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_arg_accepts_keys_and_labels() {
        assert_eq!(parse_method_arg("pix").unwrap(), PaymentMethod::Pix);
        assert_eq!(parse_method_arg("CASH").unwrap(), PaymentMethod::Cash);
        assert_eq!(parse_method_arg("dinheiro").unwrap(), PaymentMethod::Cash);
        assert_eq!(parse_method_arg("em aberto").unwrap(), PaymentMethod::Pending);
        assert_eq!(parse_method_arg("outros").unwrap(), PaymentMethod::Other);
        assert!(parse_method_arg("cheque").is_err());
    }

    #[test]
    fn test_cli_parses_import_flags() {
        let cli = Cli::try_parse_from(["caixa", "import", "x.xlsx", "--dry-run", "--preview"]).unwrap();
        match cli.command {
            Commands::Import { file, preview, dry_run, force } => {
                assert_eq!(file, "x.xlsx");
                assert!(preview && dry_run && !force);
            }
            _ => panic!("expected import"),
        }
    }
}
