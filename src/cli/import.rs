use std::path::PathBuf;

use colored::Colorize;

use crate::cli::list::transactions_table;
use crate::cli::open_default_ledger;
use crate::error::Result;
use crate::importer::{import_file, ImportOptions};
use crate::models::Transaction;
use crate::session::ImportReport;
use crate::settings::load_settings;

fn print_report(report: &ImportReport) {
    println!("--- Import summary ---");
    println!("Rows processed:  {}", report.rows_processed);
    println!("Header rows:     {}", report.header_rows_consumed);
    println!("Imported:        {}", report.imported().to_string().green());
    println!("Skipped:         {}", report.rows_skipped.to_string().yellow());
    println!("Summary rows:    {}", report.summary_rows);
    println!("Blank rows:      {}", report.empty_rows);
    for skipped in &report.skipped {
        println!("  line {}: {}", skipped.line, skipped.reason);
    }
}

fn print_preview(report: &ImportReport) {
    // Not yet stored, so there are no ids to show.
    let rows: Vec<Transaction> = report
        .transactions
        .iter()
        .map(|record| Transaction {
            id: 0,
            import_id: None,
            record: record.clone(),
        })
        .collect();
    println!("{}", transactions_table(&rows, false));
}

pub fn run(file: &str, preview: bool, dry_run: bool, force: bool) -> Result<()> {
    let file_path = PathBuf::from(file);
    let settings = load_settings();
    let options = ImportOptions {
        csv_delimiter: settings.delimiter_byte()?,
        dry_run,
        force,
    };

    let conn = open_default_ledger()?;
    let outcome = import_file(&conn, &file_path, options)?;

    if outcome.duplicate_file {
        println!("This file has already been imported (duplicate checksum). Use --force to import it again.");
        return Ok(());
    }

    if preview {
        print_preview(&outcome.report);
    }
    print_report(&outcome.report);

    match outcome.persisted {
        Some(p) if p.failed > 0 => println!(
            "{} saved, {} could not be saved",
            p.inserted,
            p.failed.to_string().red()
        ),
        Some(p) => println!("{} saved", p.inserted),
        None => println!("Dry run: nothing saved"),
    }
    Ok(())
}
