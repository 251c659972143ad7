use chrono::NaiveDate;

use crate::builder::build_record;
use crate::classifier::{classify, RowClass};
use crate::error::{Result, RowError};
use crate::models::{RawRow, TransactionRecord};

/// Cross-row state of one import run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportState {
    pub last_valid_date: Option<NaiveDate>,
    pub header_consumed: bool,
}

/// Informational progress marker. Header suppression is gated by
/// `ImportState::header_consumed`, never by the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Scanning,
    Importing,
}

impl SessionPhase {
    pub fn next(self, class: RowClass) -> Self {
        match (self, class) {
            (Self::Scanning, RowClass::HeaderCandidate | RowClass::DataRow) => Self::Importing,
            (phase, _) => phase,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: RowError,
}

#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    pub transactions: Vec<TransactionRecord>,
    pub rows_processed: usize,
    pub header_rows_consumed: usize,
    pub rows_skipped: usize,
    pub summary_rows: usize,
    pub empty_rows: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.transactions.len()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.transactions.iter().map(|t| t.date).min()?;
        let max = self.transactions.iter().map(|t| t.date).max()?;
        Some((min, max))
    }
}

/// A single forward pass over a row source.
pub struct ImportSession {
    state: ImportState,
    phase: SessionPhase,
    report: ImportReport,
}

impl Default for ImportSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ImportSession {
    pub fn new() -> Self {
        Self {
            state: ImportState::default(),
            phase: SessionPhase::Scanning,
            report: ImportReport::default(),
        }
    }

    #[cfg(test)]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[cfg(test)]
    pub fn report(&self) -> &ImportReport {
        &self.report
    }

    /// Feed one row. Row-level problems are recorded, never returned.
    pub fn process_row(&mut self, row: &RawRow) {
        self.report.rows_processed += 1;
        let class = classify(row, &self.state);
        tracing::debug!(line = row.line, ?class, content = %row.dump(), "row");
        self.phase = self.phase.next(class);

        match class {
            RowClass::Empty => self.report.empty_rows += 1,
            RowClass::SummaryRow => self.report.summary_rows += 1,
            RowClass::HeaderCandidate => {
                tracing::info!(line = row.line, "header row found");
                self.state.header_consumed = true;
                self.report.header_rows_consumed += 1;
            }
            RowClass::DataRow => match build_record(row, &mut self.state) {
                Ok(record) => self.report.transactions.push(record),
                Err(reason) => {
                    tracing::warn!(line = row.line, %reason, "row skipped");
                    self.report.rows_skipped += 1;
                    self.report.skipped.push(SkippedRow {
                        line: row.line,
                        reason,
                    });
                }
            },
        }
    }

    pub fn finish(self) -> ImportReport {
        if self.phase == SessionPhase::Scanning && self.report.rows_processed > 0 {
            tracing::warn!("no header row found; every row was read as data");
        }
        let r = &self.report;
        tracing::info!(
            processed = r.rows_processed,
            header = r.header_rows_consumed,
            imported = r.transactions.len(),
            skipped = r.rows_skipped,
            "import finished"
        );
        self.report
    }

    /// Drain a row source in order. Only a failure to read the source aborts.
    pub fn run<I>(mut self, rows: I) -> Result<ImportReport>
    where
        I: IntoIterator<Item = Result<RawRow>>,
    {
        for row in rows {
            self.process_row(&row?);
        }
        Ok(self.finish())
    }
}
