use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::open_default_ledger;
use crate::error::Result;
use crate::fmt::money;
use crate::ledger::{total_by_kind, total_by_kind_and_month};
use crate::models::TransactionKind;
use crate::reports::{self, parse_month, period_filter};

fn money_cell(value: rust_decimal::Decimal) -> Cell {
    Cell::new(money(value)).set_alignment(CellAlignment::Right)
}

pub fn summary(month: Option<String>, year: Option<i32>) -> Result<()> {
    let conn = open_default_ledger()?;
    let (y, m) = match month.as_deref().map(parse_month).transpose()? {
        Some((y, m)) => (Some(y), Some(m)),
        None => (year, None),
    };
    let totals = reports::get_summary(&conn, &period_filter(y, m)?)?;

    let mut table = Table::new();
    table.set_header(vec!["", "Valor"]);
    table.add_row(vec![Cell::new("Entradas".green().bold()), money_cell(totals.income)]);
    table.add_row(vec![Cell::new("Saídas".red().bold()), money_cell(totals.expenses)]);
    let balance = totals.balance();
    let label = if balance.is_sign_negative() && !balance.is_zero() {
        "Saldo".red().bold()
    } else {
        "Saldo".green().bold()
    };
    table.add_row(vec![Cell::new(label), money_cell(balance)]);

    let period = match (y, m) {
        (Some(y), Some(m)) => format!(" for {} {y}", reports::month_name(m)),
        (Some(y), None) => format!(" for {y}"),
        _ => String::new(),
    };
    println!("Summary{period} ({} transactions)\n{table}", totals.count);
    Ok(())
}

pub fn monthly(year: Option<i32>) -> Result<()> {
    let conn = open_default_ledger()?;
    let months = reports::get_monthly(&conn, &period_filter(year, None)?)?;
    if months.is_empty() {
        println!("No transactions.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Mês", "Entradas", "Saídas", "Saldo", "Qtd."]);
    for section in &months {
        table.add_row(vec![
            Cell::new(section.label()),
            money_cell(section.totals.income),
            money_cell(section.totals.expenses),
            money_cell(section.totals.balance()),
            Cell::new(section.totals.count).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("Monthly comparison\n{table}");
    Ok(())
}

pub fn totals() -> Result<()> {
    let conn = open_default_ledger()?;

    let mut table = Table::new();
    table.set_header(vec!["Mês", "Entradas", "Saídas", "Saldo"]);
    for month in 1..=12 {
        let income = total_by_kind_and_month(&conn, TransactionKind::Income, month)?;
        let expenses = total_by_kind_and_month(&conn, TransactionKind::Expense, month)?;
        if income.is_zero() && expenses.is_zero() {
            continue;
        }
        table.add_row(vec![
            Cell::new(reports::month_name(month)),
            money_cell(income),
            money_cell(expenses),
            money_cell(income - expenses),
        ]);
    }
    let income = total_by_kind(&conn, TransactionKind::Income)?;
    let expenses = total_by_kind(&conn, TransactionKind::Expense)?;
    table.add_row(vec![
        Cell::new("Total".bold()),
        money_cell(income),
        money_cell(expenses),
        money_cell(income - expenses),
    ]);
    println!("Totals by month (all years)\n{table}");
    Ok(())
}
