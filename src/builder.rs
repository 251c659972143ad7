use chrono::NaiveDate;

use crate::error::RowError;
use crate::models::{columns, RawRow, TransactionRecord};
use crate::parsers::{parse_amount, parse_date, parse_kind, parse_payment_method, parse_text};
use crate::session::ImportState;

/// Rows with fewer filled cells than this are suspicious but still processed.
pub const ADVISORY_MIN_CELLS: usize = 3;

/// Resolve the row's date, falling back to the carry-forward anchor when the
/// date cell is blank. A freshly parsed date becomes the new anchor.
fn resolve_date(row: &RawRow, state: &mut ImportState) -> Result<NaiveDate, RowError> {
    let cell = row.cell(columns::DATE);
    if cell.is_blank() {
        return match state.last_valid_date {
            Some(date) => {
                tracing::debug!(line = row.line, %date, "using date from previous row");
                Ok(date)
            }
            None => Err(RowError::MissingDate),
        };
    }
    let date = parse_date(cell)?;
    state.last_valid_date = Some(date);
    Ok(date)
}

/// Attempt one transaction from a data row. Failures stay scoped to the row.
pub fn build_record(row: &RawRow, state: &mut ImportState) -> Result<TransactionRecord, RowError> {
    let filled = row.non_blank_count();
    if filled < ADVISORY_MIN_CELLS {
        tracing::warn!(line = row.line, filled, "row has few filled cells, processing anyway");
    }

    let date = resolve_date(row, state)?;
    let kind = parse_kind(row.cell(columns::KIND));
    let description = parse_text(row.cell(columns::DESCRIPTION));
    let amount = parse_amount(row.cell(columns::AMOUNT))?;
    let payment_method = parse_payment_method(row.cell(columns::PAYMENT_METHOD));
    let note = parse_text(row.cell(columns::NOTE));

    Ok(TransactionRecord {
        date,
        kind,
        description,
        amount,
        payment_method,
        note,
    })
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{CellValue, PaymentMethod, TransactionKind};

    fn data_row(date: &str, kind: &str, desc: &str, amount: &str, method: &str) -> RawRow {
        RawRow::new(
            1,
            vec![
                CellValue::from(date),
                CellValue::Blank,
                CellValue::from(kind),
                CellValue::from(desc),
                CellValue::from(amount),
                CellValue::from(method),
            ],
        )
    }

    #[test]
    fn test_build_record_all_fields() {
        let mut state = ImportState::default();
        let row = data_row("01/03/2024", "ENTRADA", " Salário ", "1000,00", "PIX");
        let rec = build_record(&row, &mut state).unwrap();
        assert_eq!(rec.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(rec.kind, TransactionKind::Income);
        assert_eq!(rec.description, "Salário");
        assert_eq!(rec.amount, Decimal::new(1000, 0));
        assert_eq!(rec.payment_method, PaymentMethod::Pix);
        assert_eq!(rec.note, "");
        assert_eq!(state.last_valid_date, Some(rec.date));
    }

    #[test]
    fn test_blank_date_carries_forward() {
        let mut state = ImportState::default();
        let a = data_row("01/03/2024", "ENTRADA", "Salário", "1000,00", "PIX");
        let b = data_row("", "SAIDA", "Aluguel", "500,00", "DINHEIRO");
        let first = build_record(&a, &mut state).unwrap();
        let second = build_record(&b, &mut state).unwrap();
        assert_eq!(second.date, first.date);
        assert_eq!(second.kind, TransactionKind::Expense);
        assert_eq!(second.payment_method, PaymentMethod::Cash);
    }

    #[test]
    fn test_anchor_moves_with_each_dated_row() {
        let mut state = ImportState::default();
        build_record(&data_row("01/03/2024", "", "a", "1", ""), &mut state).unwrap();
        build_record(&data_row("05/03/2024", "", "b", "1", ""), &mut state).unwrap();
        let c = build_record(&data_row("", "", "c", "1", ""), &mut state).unwrap();
        assert_eq!(c.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    }

    #[test]
    fn test_blank_date_without_anchor_fails() {
        let mut state = ImportState::default();
        let row = data_row("", "SAIDA", "Aluguel", "500,00", "DINHEIRO");
        assert_eq!(build_record(&row, &mut state), Err(RowError::MissingDate));
    }

    #[test]
    fn test_invalid_date_does_not_move_anchor() {
        let mut state = ImportState::default();
        build_record(&data_row("01/03/2024", "", "a", "1", ""), &mut state).unwrap();
        let bad = data_row("31/02/2024", "", "b", "1", "");
        assert!(matches!(build_record(&bad, &mut state), Err(RowError::InvalidDate(_))));
        assert_eq!(state.last_valid_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn test_anchor_moves_even_when_amount_fails() {
        let mut state = ImportState::default();
        build_record(&data_row("01/03/2024", "", "a", "1", ""), &mut state).unwrap();
        let bad = data_row("10/03/2024", "SAIDA", "Mercado", "abc", "");
        assert!(matches!(build_record(&bad, &mut state), Err(RowError::InvalidAmount(_))));
        let next = build_record(&data_row("", "SAIDA", "Feira", "20,00", ""), &mut state).unwrap();
        assert_eq!(next.date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn test_invalid_amount_rejects_row() {
        let mut state = ImportState::default();
        let row = data_row("02/03/2024", "SAIDA", "Mercado", "abc", "DINHEIRO");
        assert_eq!(
            build_record(&row, &mut state),
            Err(RowError::InvalidAmount("abc".to_string()))
        );
    }

    #[test]
    fn test_defaults_do_not_block_acceptance() {
        let mut state = ImportState::default();
        let row = RawRow::new(7, vec![CellValue::from("01/03/2024")]);
        let rec = build_record(&row, &mut state).unwrap();
        assert_eq!(rec.amount, Decimal::ZERO);
        assert_eq!(rec.kind, TransactionKind::Expense);
        assert_eq!(rec.payment_method, PaymentMethod::Other);
        assert!(rec.description.is_empty());
    }
}
