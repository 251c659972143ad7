use crate::models::{columns, RawRow};
use crate::session::ImportState;

/// Month abbreviations and totals markers that open subtotal rows.
pub const SUMMARY_LABELS: &[&str] = &[
    "MÊS", "JAN", "FEV", "MAR", "ABR", "MAI", "JUN", "JUL", "AGO", "SET", "OUT", "NOV", "DEZ",
    "TOTAL",
];

pub const HEADER_KEYWORDS: &[&str] = &[
    "DATA",
    "TIPO",
    "DESCRIÇÃO",
    "DESCRIÇAO",
    "DESCRICAO",
    "VALOR",
    "PAGAMENTO",
    "FORMA",
    "OBSERVAÇÃO",
    "OBSERVACAO",
    "OBS",
    "ENTRADA",
    "SAÍDA",
    "SAIDA",
    "RECEITA",
    "DESPESA",
    "HEADER",
];

/// Minimum number of header keywords for a row to look like a header.
pub const HEADER_MIN_KEYWORDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    Empty,
    HeaderCandidate,
    SummaryRow,
    DataRow,
}

fn layout_cells(row: &RawRow) -> impl Iterator<Item = &crate::models::CellValue> {
    (0..=columns::NOTE).map(move |i| row.cell(i))
}

pub fn is_empty(row: &RawRow) -> bool {
    layout_cells(row).all(|c| c.is_blank())
}

pub fn is_summary(row: &RawRow) -> bool {
    let first = row.cell(columns::DATE).normalized();
    SUMMARY_LABELS.contains(&first.as_str())
}

pub fn header_keyword_count(row: &RawRow) -> usize {
    layout_cells(row)
        .filter(|c| HEADER_KEYWORDS.contains(&c.normalized().as_str()))
        .count()
}

/// Classify one row. Pure: acting on a header candidate (flipping
/// `header_consumed`) is the session's job.
pub fn classify(row: &RawRow, state: &ImportState) -> RowClass {
    if is_empty(row) {
        RowClass::Empty
    } else if is_summary(row) {
        RowClass::SummaryRow
    } else if !state.header_consumed && header_keyword_count(row) >= HEADER_MIN_KEYWORDS {
        RowClass::HeaderCandidate
    } else {
        RowClass::DataRow
    }
}
