use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::error::{CaixaError, Result};
use crate::ledger::{list, TransactionFilter};
use crate::models::{Transaction, TransactionKind};

// ---------------------------------------------------------------------------
// Period filter helper
// ---------------------------------------------------------------------------

/// Parse `YYYY-MM` into (year, month).
pub fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let invalid = || CaixaError::InvalidInput(format!("expected YYYY-MM, got {raw}"));
    let (y, m) = raw.split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()
}

/// A month wins over a bare year; with neither, everything is included.
pub fn period_filter(year: Option<i32>, month: Option<u32>) -> Result<TransactionFilter> {
    let invalid = || CaixaError::InvalidInput("invalid period".to_string());
    match (year, month) {
        (Some(y), Some(m)) => Ok(TransactionFilter::date_range(
            NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(invalid)?,
            last_day_of_month(y, m).ok_or_else(invalid)?,
        )),
        (Some(y), None) => Ok(TransactionFilter::date_range(
            NaiveDate::from_ymd_opt(y, 1, 1).ok_or_else(invalid)?,
            NaiveDate::from_ymd_opt(y, 12, 31).ok_or_else(invalid)?,
        )),
        (None, _) => Ok(TransactionFilter::default()),
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Totals {
    pub income: Decimal,
    pub expenses: Decimal,
    pub count: usize,
}

impl Totals {
    pub fn balance(&self) -> Decimal {
        self.income - self.expenses
    }

    fn add(&mut self, t: &Transaction) {
        match t.record.kind {
            TransactionKind::Income => self.income += t.record.amount,
            TransactionKind::Expense => self.expenses += t.record.amount,
        }
        self.count += 1;
    }
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut totals = Totals::default();
    for t in transactions {
        totals.add(t);
    }
    totals
}

pub fn get_summary(conn: &Connection, filter: &TransactionFilter) -> Result<Totals> {
    Ok(totals(&list(conn, filter)?))
}

// ---------------------------------------------------------------------------
// Monthly breakdown
// ---------------------------------------------------------------------------

pub struct MonthSection {
    pub year: i32,
    pub month: u32,
    pub transactions: Vec<Transaction>,
    pub totals: Totals,
}

impl MonthSection {
    pub fn label(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }
}

pub fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho", "Julho", "Agosto", "Setembro",
        "Outubro", "Novembro", "Dezembro",
    ];
    NAMES
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("?")
}

/// Group transactions by calendar month, oldest first.
pub fn group_by_month(transactions: Vec<Transaction>) -> Vec<MonthSection> {
    let mut groups: BTreeMap<(i32, u32), Vec<Transaction>> = BTreeMap::new();
    for t in transactions {
        let key = (t.record.date.year(), t.record.date.month());
        groups.entry(key).or_default().push(t);
    }
    groups
        .into_iter()
        .map(|((year, month), transactions)| MonthSection {
            year,
            month,
            totals: totals(&transactions),
            transactions,
        })
        .collect()
}

pub fn get_monthly(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<MonthSection>> {
    Ok(group_by_month(list(conn, filter)?))
}
