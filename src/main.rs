mod builder;
mod classifier;
mod cli;
mod db;
mod error;
mod export;
mod fmt;
mod importer;
mod ledger;
mod logging;
mod models;
mod parsers;
#[cfg(feature = "pdf")]
mod pdf;
mod reports;
mod session;
mod settings;
mod source;

use clap::Parser;

use cli::{Cli, Commands, ExportCommands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Import {
            file,
            preview,
            dry_run,
            force,
        } => cli::import::run(&file, preview, dry_run, force),
        Commands::Add {
            date,
            kind,
            description,
            amount,
            method,
            note,
        } => cli::entry::add(&date, &kind, &description, &amount, &method, &note),
        Commands::List {
            from_date,
            to_date,
            method,
            kind,
        } => cli::list::run(from_date, to_date, method, kind),
        Commands::Edit {
            id,
            date,
            kind,
            description,
            amount,
            method,
            note,
        } => cli::entry::edit(
            id,
            cli::entry::EditArgs {
                date,
                kind,
                description,
                amount,
                method,
                note,
            },
        ),
        Commands::Delete { ids } => cli::entry::delete(&ids),
        Commands::Summary { month, year } => cli::report::summary(month, year),
        Commands::Monthly { year } => cli::report::monthly(year),
        Commands::Totals => cli::report::totals(),
        Commands::Export { command } => match command {
            ExportCommands::Csv { output } => cli::export::csv(&output),
            #[cfg(feature = "pdf")]
            ExportCommands::Pdf { year, output } => cli::export::pdf(year, output),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
