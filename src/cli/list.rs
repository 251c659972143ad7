use colored::Colorize;
use comfy_table::{Cell, CellAlignment, Table};

use crate::cli::{open_default_ledger, parse_method_arg};
use crate::cli::entry::{parse_date_arg, parse_kind_arg};
use crate::error::Result;
use crate::fmt::{date, money};
use crate::ledger::{list, TransactionFilter};
use crate::models::{Transaction, TransactionKind};
use crate::reports::totals;

pub fn transactions_table(rows: &[Transaction], show_ids: bool) -> Table {
    let mut table = Table::new();
    let mut header = vec!["Data", "Tipo", "Descrição", "Valor", "Pagamento", "Obs"];
    if show_ids {
        header.insert(0, "ID");
        header.push("Import");
    }
    table.set_header(header);
    for t in rows {
        let r = &t.record;
        let kind = match r.kind {
            TransactionKind::Income => r.kind.label().green(),
            TransactionKind::Expense => r.kind.label().red(),
        };
        let mut cells = vec![
            Cell::new(date(r.date)),
            Cell::new(kind),
            Cell::new(&r.description),
            Cell::new(money(r.amount)).set_alignment(CellAlignment::Right),
            Cell::new(r.payment_method.label()),
            Cell::new(&r.note),
        ];
        if show_ids {
            cells.insert(0, Cell::new(t.id));
            cells.push(Cell::new(t.import_id.map(|i| format!("#{i}")).unwrap_or_default()));
        }
        table.add_row(cells);
    }
    table
}

pub fn run(
    from_date: Option<String>,
    to_date: Option<String>,
    method: Option<String>,
    kind: Option<String>,
) -> Result<()> {
    let conn = open_default_ledger()?;
    let filter = TransactionFilter {
        from: from_date.as_deref().map(parse_date_arg).transpose()?,
        to: to_date.as_deref().map(parse_date_arg).transpose()?,
        payment_method: method.as_deref().map(parse_method_arg).transpose()?,
        kind: kind.as_deref().map(parse_kind_arg),
    };
    let rows = list(&conn, &filter)?;
    if rows.is_empty() {
        println!("No transactions.");
        return Ok(());
    }
    println!("Transactions\n{}", transactions_table(&rows, true));
    let t = totals(&rows);
    println!(
        "{} entries | in {} | out {} | balance {}",
        t.count,
        money(t.income).green(),
        money(t.expenses).red(),
        money(t.balance()).bold()
    );
    Ok(())
}
