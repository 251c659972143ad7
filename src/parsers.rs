use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::error::RowError;
use crate::models::{CellValue, PaymentMethod, TransactionKind};

static DAY_MONTH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());
static YEAR_MONTH_DAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap());
static COMPACT_DMY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{8}$").unwrap());
static INCOME_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)ENTRADA|RECEITA|CR[ÉE]DITO").unwrap());

// Substring rules, checked in order against upper-cased text.
const PAYMENT_RULES: &[(&[&str], PaymentMethod)] = &[
    (&["DÉBITO", "DEBITO"], PaymentMethod::Debit),
    (&["CRÉDITO", "CREDITO"], PaymentMethod::Credit),
    (&["PIX"], PaymentMethod::Pix),
    (&["DINHEIRO"], PaymentMethod::Cash),
    (&["EM ABERTO"], PaymentMethod::Pending),
    (&["TRANSFERÊNCIA", "TRANSFERENCIA"], PaymentMethod::Transfer),
];

// ---------------------------------------------------------------------------
// Date
// ---------------------------------------------------------------------------

fn ymd(y: &str, m: &str, d: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

fn parse_dmy(s: &str) -> Option<NaiveDate> {
    let caps = DAY_MONTH_YEAR.captures(s)?;
    ymd(&caps[3], &caps[2], &caps[1])
}

/// Parse a date cell. The first pattern that matches the cleaned text decides
/// the outcome: an impossible calendar date is an error, not a cue to try the
/// next pattern.
pub fn parse_date(cell: &CellValue) -> Result<NaiveDate, RowError> {
    if let CellValue::DateTyped(d) = cell {
        return Ok(*d);
    }
    let raw = cell.display();
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(RowError::InvalidDate(String::new()));
    }
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '/' || *c == '-')
        .collect();

    let parsed = if DAY_MONTH_YEAR.is_match(&cleaned) {
        parse_dmy(&cleaned)
    } else if let Some(caps) = YEAR_MONTH_DAY.captures(&cleaned) {
        ymd(&caps[1], &caps[2], &caps[3])
    } else if COMPACT_DMY.is_match(&cleaned) {
        parse_dmy(&format!("{}/{}/{}", &cleaned[0..2], &cleaned[2..4], &cleaned[4..]))
    } else {
        None
    };
    parsed.ok_or_else(|| RowError::InvalidDate(raw.to_string()))
}

/// Spreadsheet serial day number to a calendar date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(chrono::Duration::days(serial.floor() as i64))
}

// ---------------------------------------------------------------------------
// Amount
// ---------------------------------------------------------------------------

/// Parse a monetary cell written in the `R$ 1.234,56` convention.
pub fn parse_amount(cell: &CellValue) -> Result<Decimal, RowError> {
    match cell {
        CellValue::Blank => Ok(Decimal::ZERO),
        CellValue::Numeric(d) => Ok(*d),
        other => {
            let raw = other.display();
            let cleaned = raw
                .replace(['R', '$', '.'], "")
                .replace(',', ".");
            let cleaned = cleaned.trim();
            if cleaned.is_empty() {
                return Ok(Decimal::ZERO);
            }
            // Magnitudes past Decimal's range (about 7.9e28) are rejected as InvalidAmount.
            cleaned
                .parse::<Decimal>()
                .map_err(|_| RowError::InvalidAmount(raw.trim().to_string()))
        }
    }
}

pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}

// ---------------------------------------------------------------------------
// Kind / payment method / free text
// ---------------------------------------------------------------------------

pub fn parse_kind(cell: &CellValue) -> TransactionKind {
    if INCOME_MARKER.is_match(&cell.normalized()) {
        TransactionKind::Income
    } else {
        TransactionKind::Expense
    }
}

pub fn parse_payment_method(cell: &CellValue) -> PaymentMethod {
    let text = cell.normalized();
    if text.is_empty() {
        return PaymentMethod::Other;
    }
    PAYMENT_RULES
        .iter()
        .find(|(needles, _)| needles.iter().any(|n| text.contains(n)))
        .map(|(_, method)| *method)
        .unwrap_or(PaymentMethod::Other)
}

pub fn parse_text(cell: &CellValue) -> String {
    cell.display().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_date_encodings_agree() {
        let expected = date(2024, 3, 1);
        assert_eq!(parse_date(&text("2024-03-01")), Ok(expected));
        assert_eq!(parse_date(&text("01/03/2024")), Ok(expected));
        assert_eq!(parse_date(&text("01032024")), Ok(expected));
        assert_eq!(parse_date(&CellValue::DateTyped(expected)), Ok(expected));
    }

    #[test]
    fn test_parse_date_single_digit_parts() {
        assert_eq!(parse_date(&text("1/3/2024")), Ok(date(2024, 3, 1)));
        assert_eq!(parse_date(&text("2024-3-1")), Ok(date(2024, 3, 1)));
    }

    #[test]
    fn test_parse_date_strips_noise() {
        assert_eq!(parse_date(&text(" 05/12/2023 ")), Ok(date(2023, 12, 5)));
        assert_eq!(parse_date(&text("dia 05/12/2023")), Ok(date(2023, 12, 5)));
    }

    #[test]
    fn test_parse_date_no_fallback_after_match() {
        assert_eq!(
            parse_date(&text("31/02/2024")),
            Err(RowError::InvalidDate("31/02/2024".to_string()))
        );
        assert_eq!(
            parse_date(&text("32132024")),
            Err(RowError::InvalidDate("32132024".to_string()))
        );
    }

    #[test]
    fn test_parse_date_rejects_blank_and_unmatched() {
        assert!(matches!(parse_date(&CellValue::Blank), Err(RowError::InvalidDate(_))));
        assert!(matches!(parse_date(&text("ontem")), Err(RowError::InvalidDate(_))));
        assert!(matches!(parse_date(&text("01/03/24")), Err(RowError::InvalidDate(_))));
    }

    #[test]
    fn test_excel_serial_to_date() {
        assert_eq!(excel_serial_to_date(45667.0), Some(date(2025, 1, 10)));
        assert_eq!(excel_serial_to_date(45352.75), Some(date(2024, 3, 1)));
    }

    #[test]
    fn test_parse_amount_brazilian_format() {
        assert_eq!(parse_amount(&text("R$ 1.234,56")), Ok(Decimal::new(123456, 2)));
        assert_eq!(parse_amount(&text("1000,00")), Ok(Decimal::new(1000, 0)));
        assert_eq!(parse_amount(&text("R$1.000.000")), Ok(Decimal::new(1_000_000, 0)));
    }

    #[test]
    fn test_parse_amount_blank_is_zero() {
        assert_eq!(parse_amount(&CellValue::Blank), Ok(Decimal::ZERO));
        assert_eq!(parse_amount(&text("")), Ok(Decimal::ZERO));
        assert_eq!(parse_amount(&text("R$ ")), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_parse_amount_numeric_passthrough() {
        let d = Decimal::new(5050, 2);
        assert_eq!(parse_amount(&CellValue::Numeric(d)), Ok(d));
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert_eq!(parse_amount(&text("abc")), Err(RowError::InvalidAmount("abc".to_string())));
        assert!(parse_amount(&text("12,34,56")).is_err());
    }

    #[test]
    fn test_parse_amount_out_of_range_is_invalid() {
        let huge = "99999999999999999999999999999999,00";
        assert_eq!(parse_amount(&text(huge)), Err(RowError::InvalidAmount(huge.to_string())));
    }

    #[test]
    fn test_parse_amount_negative_passes_through() {
        assert_eq!(parse_amount(&text("-50,00")), Ok(Decimal::new(-50, 0)));
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(parse_kind(&text("crédito")), TransactionKind::Income);
        assert_eq!(parse_kind(&text("ENTRADA")), TransactionKind::Income);
        assert_eq!(parse_kind(&text("Receita extra")), TransactionKind::Income);
        assert_eq!(parse_kind(&text("credito")), TransactionKind::Income);
        assert_eq!(parse_kind(&text("SAIDA")), TransactionKind::Expense);
        assert_eq!(parse_kind(&text("")), TransactionKind::Expense);
        assert_eq!(parse_kind(&CellValue::Blank), TransactionKind::Expense);
    }

    #[test]
    fn test_parse_payment_method_rules_in_order() {
        assert_eq!(parse_payment_method(&text("cartão de débito")), PaymentMethod::Debit);
        assert_eq!(parse_payment_method(&text("Credito")), PaymentMethod::Credit);
        assert_eq!(parse_payment_method(&text("pix")), PaymentMethod::Pix);
        assert_eq!(parse_payment_method(&text("DINHEIRO")), PaymentMethod::Cash);
        assert_eq!(parse_payment_method(&text("em aberto")), PaymentMethod::Pending);
        assert_eq!(parse_payment_method(&text("Transferência")), PaymentMethod::Transfer);
        // debit wins over credit when both appear
        assert_eq!(parse_payment_method(&text("DEBITO/CREDITO")), PaymentMethod::Debit);
        assert_eq!(parse_payment_method(&text("boleto")), PaymentMethod::Other);
        assert_eq!(parse_payment_method(&CellValue::Blank), PaymentMethod::Other);
    }

    #[test]
    fn test_parse_text_trims() {
        assert_eq!(parse_text(&text("  Mercado  ")), "Mercado");
        assert_eq!(parse_text(&CellValue::Blank), "");
    }
}
