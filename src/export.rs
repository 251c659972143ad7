use std::io::Write;

use crate::error::Result;
use crate::fmt;
use crate::models::Transaction;

pub const CSV_HEADER: &[&str] = &["ID", "Data", "Tipo", "Descrição", "Valor", "FormaPagamento", "Obs"];

/// Write stored transactions as a comma-separated sheet.
pub fn write_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(CSV_HEADER)?;
    for t in transactions {
        let r = &t.record;
        wtr.write_record([
            t.id.to_string(),
            fmt::date(r.date),
            r.kind.label().to_string(),
            r.description.clone(),
            format!("{:.2}", r.amount),
            r.payment_method.label().to_string(),
            r.note.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::{PaymentMethod, TransactionKind, TransactionRecord};

    #[test]
    fn test_write_csv_quotes_commas() {
        let t = Transaction {
            id: 7,
            import_id: None,
            record: TransactionRecord {
                date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                kind: TransactionKind::Expense,
                description: "Mercado, feira".to_string(),
                amount: Decimal::new(4590, 2),
                payment_method: PaymentMethod::Cash,
                note: String::new(),
            },
        };
        let mut buf = Vec::new();
        write_csv(&mut buf, &[t]).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("ID,Data,Tipo,Descrição,Valor,FormaPagamento,Obs"));
        assert_eq!(lines.next(), Some("7,01/03/2024,SAÍDA,\"Mercado, feira\",45.90,DINHEIRO,"));
    }

    #[test]
    fn test_write_csv_empty_ledger_has_header_only() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}
