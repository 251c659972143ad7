use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use calamine::{Data, Reader};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::{CaixaError, Result};
use crate::models::{CellValue, RawRow};
use crate::parsers::{decimal_from_f64, excel_serial_to_date};

/// An in-order, single-pass stream of spreadsheet rows.
pub type RowSource = Box<dyn Iterator<Item = Result<RawRow>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Workbook,
    Delimited,
}

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];
const DELIMITED_EXTENSIONS: &[&str] = &["csv", "txt"];

pub fn detect_kind(path: &Path) -> Option<SourceKind> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if WORKBOOK_EXTENSIONS.contains(&ext.as_str()) {
        Some(SourceKind::Workbook)
    } else if DELIMITED_EXTENSIONS.contains(&ext.as_str()) {
        Some(SourceKind::Delimited)
    } else {
        None
    }
}

/// Open the right row source for a file, by extension.
pub fn open_source(path: &Path, csv_delimiter: Option<u8>) -> Result<RowSource> {
    match detect_kind(path) {
        Some(SourceKind::Workbook) => Ok(Box::new(WorkbookSource::open(path)?)),
        Some(SourceKind::Delimited) => Ok(Box::new(CsvSource::open(path, csv_delimiter)?)),
        None => Err(CaixaError::ImportFailed(format!(
            "unsupported file type: {}",
            path.display()
        ))),
    }
}

// ---------------------------------------------------------------------------
// Workbook (first sheet only)
// ---------------------------------------------------------------------------

pub struct WorkbookSource {
    rows: std::vec::IntoIter<RawRow>,
}

fn workbook_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Blank,
        Data::String(s) if s.trim().is_empty() => CellValue::Blank,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => decimal_from_f64(*f)
            .map(CellValue::Numeric)
            .unwrap_or_else(|| CellValue::Text(f.to_string())),
        Data::Int(i) => CellValue::Numeric(Decimal::from(*i)),
        Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
            .map(CellValue::DateTyped)
            .unwrap_or_else(|| CellValue::Text(dt.as_f64().to_string())),
        Data::DateTimeIso(s) => s
            .get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(CellValue::DateTyped)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        other => CellValue::Text(other.to_string()),
    }
}

impl WorkbookSource {
    pub fn open(path: &Path) -> Result<Self> {
        let mut workbook = calamine::open_workbook_auto(path)
            .map_err(|e| CaixaError::ImportFailed(format!("cannot open {}: {e}", path.display())))?;
        let first = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| CaixaError::ImportFailed("workbook has no sheets".to_string()))?;
        let range = workbook
            .worksheet_range(&first)
            .map_err(|e| CaixaError::ImportFailed(format!("cannot read sheet {first}: {e}")))?;

        // Leading columns trimmed by the reader must be restored so the fixed
        // column layout still lines up.
        let (first_row, first_col) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        let rows: Vec<RawRow> = range
            .rows()
            .enumerate()
            .map(|(i, cells)| {
                let mut values = vec![CellValue::Blank; first_col];
                values.extend(cells.iter().map(workbook_cell));
                RawRow::new(first_row + i + 1, values)
            })
            .collect();
        tracing::debug!(sheet = %first, rows = rows.len(), "workbook loaded");
        Ok(Self {
            rows: rows.into_iter(),
        })
    }
}

impl Iterator for WorkbookSource {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next().map(Ok)
    }
}

// ---------------------------------------------------------------------------
// Delimited text export
// ---------------------------------------------------------------------------

pub struct CsvSource {
    records: csv::ByteRecordsIntoIter<File>,
}

const SNIFF_LINES: usize = 10;

/// Pick `;` or `,` from whichever appears more often across the sampled
/// lines. Title lines without any separator just don't vote.
pub fn sniff_delimiter<'a, I>(lines: I) -> u8
where
    I: IntoIterator<Item = &'a str>,
{
    let (semicolons, commas) = lines.into_iter().fold((0, 0), |(s, c), line| {
        (s + line.matches(';').count(), c + line.matches(',').count())
    });
    if semicolons >= commas && semicolons > 0 {
        b';'
    } else {
        b','
    }
}

/// Exports from older tools are often Latin-1; fall back to it when a field
/// is not valid UTF-8.
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

impl CsvSource {
    pub fn open(path: &Path, delimiter: Option<u8>) -> Result<Self> {
        let delimiter = match delimiter {
            Some(d) => d,
            None => {
                let mut sample = Vec::new();
                for line in BufReader::new(File::open(path)?).split(b'\n') {
                    let line = decode_field(&line?);
                    if line.trim().is_empty() {
                        continue;
                    }
                    sample.push(line);
                    if sample.len() == SNIFF_LINES {
                        break;
                    }
                }
                sniff_delimiter(sample.iter().map(String::as_str))
            }
        };
        let file = File::open(path)?;
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(file);
        Ok(Self {
            records: reader.into_byte_records(),
        })
    }
}

impl Iterator for CsvSource {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(CaixaError::ImportFailed(e.to_string()))),
        };
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        let cells = record
            .iter()
            .map(|field| CellValue::from(decode_field(field).as_str()))
            .collect();
        Some(Ok(RawRow::new(line, cells)))
    }
}
