use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaixaError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Import failed: {0}")]
    ImportFailed(String),

    #[error("Transaction not found: {0}")]
    NotFound(i64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[cfg(feature = "pdf")]
    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CaixaError>;

/// A problem confined to one spreadsheet row. The import session recovers
/// from every variant by skipping the row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("date cell is blank and no earlier date is available")]
    MissingDate,

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),
}
