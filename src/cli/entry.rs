use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::cli::{open_default_ledger, parse_method_arg};
use crate::error::{CaixaError, Result};
use crate::fmt::money;
use crate::ledger::{self, TransactionStore};
use crate::models::{CellValue, TransactionKind, TransactionRecord};
use crate::parsers::{parse_amount, parse_date, parse_kind};

// Manual input goes through the same field parsers as imported cells, but a
// failure is reported to the user instead of skipping.

pub(crate) fn parse_date_arg(raw: &str) -> Result<NaiveDate> {
    parse_date(&CellValue::from(raw)).map_err(|e| CaixaError::InvalidInput(e.to_string()))
}

fn parse_amount_arg(raw: &str) -> Result<Decimal> {
    let amount = parse_amount(&CellValue::from(raw)).map_err(|e| CaixaError::InvalidInput(e.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CaixaError::InvalidInput(format!(
            "amount must not be negative: {raw} (use --kind to record an expense)"
        )));
    }
    Ok(amount)
}

pub(crate) fn parse_kind_arg(raw: &str) -> TransactionKind {
    parse_kind(&CellValue::from(raw))
}

pub fn add(
    date: &str,
    kind: &str,
    description: &str,
    amount: &str,
    method: &str,
    note: &str,
) -> Result<()> {
    let record = TransactionRecord {
        date: parse_date_arg(date)?,
        kind: parse_kind_arg(kind),
        description: description.trim().to_string(),
        amount: parse_amount_arg(amount)?,
        payment_method: parse_method_arg(method)?,
        note: note.trim().to_string(),
    };
    let conn = open_default_ledger()?;
    let id = conn.insert(&record)?;
    println!(
        "Added #{id}: {} {} {}",
        record.kind.label(),
        record.description,
        money(record.amount)
    );
    Ok(())
}

pub struct EditArgs {
    pub date: Option<String>,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub amount: Option<String>,
    pub method: Option<String>,
    pub note: Option<String>,
}

pub fn edit(id: i64, args: EditArgs) -> Result<()> {
    let conn = open_default_ledger()?;
    let mut record = ledger::get_by_id(&conn, id)?.record;
    if let Some(d) = args.date {
        record.date = parse_date_arg(&d)?;
    }
    if let Some(k) = args.kind {
        record.kind = parse_kind_arg(&k);
    }
    if let Some(d) = args.description {
        record.description = d.trim().to_string();
    }
    if let Some(a) = args.amount {
        record.amount = parse_amount_arg(&a)?;
    }
    if let Some(m) = args.method {
        record.payment_method = parse_method_arg(&m)?;
    }
    if let Some(n) = args.note {
        record.note = n.trim().to_string();
    }
    ledger::update(&conn, id, &record)?;
    println!("Updated #{id}");
    Ok(())
}

/// Delete each id independently; a missing id does not stop the rest.
pub fn delete(ids: &[i64]) -> Result<()> {
    let conn = open_default_ledger()?;
    let mut missing = Vec::new();
    for &id in ids {
        match ledger::delete(&conn, id) {
            Ok(()) => println!("Deleted #{id}"),
            Err(CaixaError::NotFound(_)) => missing.push(id),
            Err(e) => return Err(e),
        }
    }
    if !missing.is_empty() {
        let list: Vec<String> = missing.iter().map(|id| format!("#{id}")).collect();
        return Err(CaixaError::Other(format!("not found: {}", list.join(", "))));
    }
    Ok(())
}
