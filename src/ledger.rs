use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, ToSql};
use rust_decimal::Decimal;

use crate::error::{CaixaError, Result};
use crate::models::{PaymentMethod, Transaction, TransactionKind, TransactionRecord};

/// Anything that can take ownership of an accepted record and hand back its id.
pub trait TransactionStore {
    fn insert(&self, record: &TransactionRecord) -> Result<i64>;
}

fn insert_row(conn: &Connection, record: &TransactionRecord, import_id: Option<i64>) -> Result<i64> {
    conn.execute(
        "INSERT INTO transactions (date, kind, description, amount, payment_method, note, import_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
            record.date,
            record.kind.key(),
            record.description,
            record.amount.to_string(),
            record.payment_method.key(),
            record.note,
            import_id,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Manual entries: not tied to any import.
impl TransactionStore for Connection {
    fn insert(&self, record: &TransactionRecord) -> Result<i64> {
        insert_row(self, record, None)
    }
}

/// Inserts that belong to one recorded import.
pub struct ImportBatch<'a> {
    pub conn: &'a Connection,
    pub import_id: i64,
}

impl TransactionStore for ImportBatch<'_> {
    fn insert(&self, record: &TransactionRecord) -> Result<i64> {
        insert_row(self.conn, record, Some(self.import_id))
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct PersistResult {
    pub inserted: usize,
    pub failed: usize,
}

/// Hand records to the store one at a time. A failed insert is logged and
/// counted; the remaining records are still attempted.
pub fn persist_records<S: TransactionStore>(store: &S, records: &[TransactionRecord]) -> PersistResult {
    let mut result = PersistResult::default();
    for record in records {
        match store.insert(record) {
            Ok(id) => {
                tracing::debug!(id, description = %record.description, "stored");
                result.inserted += 1;
            }
            Err(e) => {
                tracing::warn!(date = %record.date, description = %record.description, error = %e, "insert failed");
                result.failed += 1;
            }
        }
    }
    result
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

fn conversion_error(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

fn map_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
    let kind: String = row.get(2)?;
    let amount: String = row.get(4)?;
    let method: String = row.get(5)?;
    Ok(Transaction {
        id: row.get(0)?,
        import_id: row.get(7)?,
        record: TransactionRecord {
            date: row.get(1)?,
            kind: TransactionKind::from_key(&kind)
                .ok_or_else(|| conversion_error(2, format!("unknown kind {kind}")))?,
            description: row.get(3)?,
            amount: amount
                .parse::<Decimal>()
                .map_err(|e| conversion_error(4, e.to_string()))?,
            payment_method: PaymentMethod::from_key(&method)
                .ok_or_else(|| conversion_error(5, format!("unknown payment method {method}")))?,
            note: row.get(6)?,
        },
    })
}

const SELECT_COLUMNS: &str =
    "SELECT id, date, kind, description, amount, payment_method, note, import_id FROM transactions";

/// Optional constraints for listing stored transactions. Date bounds are
/// inclusive.
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub kind: Option<TransactionKind>,
}

impl TransactionFilter {
    pub fn date_range(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
            ..Self::default()
        }
    }

    fn where_clause(&self) -> (String, Vec<Box<dyn ToSql>>) {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();
        if let Some(from) = self.from {
            params.push(Box::new(from));
            clauses.push(format!("date >= ?{}", params.len()));
        }
        if let Some(to) = self.to {
            params.push(Box::new(to));
            clauses.push(format!("date <= ?{}", params.len()));
        }
        if let Some(method) = self.payment_method {
            params.push(Box::new(method.key()));
            clauses.push(format!("payment_method = ?{}", params.len()));
        }
        if let Some(kind) = self.kind {
            params.push(Box::new(kind.key()));
            clauses.push(format!("kind = ?{}", params.len()));
        }
        if clauses.is_empty() {
            (String::new(), params)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), params)
        }
    }
}

pub fn list(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
    let (clause, params) = filter.where_clause();
    let sql = format!("{SELECT_COLUMNS}{clause} ORDER BY date, id");
    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(param_refs.as_slice(), map_transaction)?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

pub fn list_all(conn: &Connection) -> Result<Vec<Transaction>> {
    list(conn, &TransactionFilter::default())
}

pub fn get_by_id(conn: &Connection, id: i64) -> Result<Transaction> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?1");
    conn.query_row(&sql, [id], map_transaction)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => CaixaError::NotFound(id),
            other => other.into(),
        })
}

pub fn update(conn: &Connection, id: i64, record: &TransactionRecord) -> Result<()> {
    let changed = conn.execute(
        "UPDATE transactions SET date = ?1, kind = ?2, description = ?3, amount = ?4, \
         payment_method = ?5, note = ?6 WHERE id = ?7",
        rusqlite::params![
            record.date,
            record.kind.key(),
            record.description,
            record.amount.to_string(),
            record.payment_method.key(),
            record.note,
            id,
        ],
    )?;
    if changed == 0 {
        return Err(CaixaError::NotFound(id));
    }
    Ok(())
}

pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let changed = conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    if changed == 0 {
        return Err(CaixaError::NotFound(id));
    }
    Ok(())
}

fn sum_amounts(conn: &Connection, sql: &str, params: &[&dyn ToSql]) -> Result<Decimal> {
    let mut stmt = conn.prepare(sql)?;
    let amounts = stmt
        .query_map(params, |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    amounts.iter().try_fold(Decimal::ZERO, |acc, a| {
        a.parse::<Decimal>()
            .map(|d| acc + d)
            .map_err(|e| CaixaError::Other(format!("corrupt amount {a}: {e}")))
    })
}

pub fn total_by_kind(conn: &Connection, kind: TransactionKind) -> Result<Decimal> {
    sum_amounts(conn, "SELECT amount FROM transactions WHERE kind = ?1", &[&kind.key()])
}

/// Total for a calendar month (1-12), summed across every year on record.
pub fn total_by_kind_and_month(conn: &Connection, kind: TransactionKind, month: u32) -> Result<Decimal> {
    let month = format!("{month:02}");
    sum_amounts(
        conn,
        "SELECT amount FROM transactions WHERE kind = ?1 AND strftime('%m', date) = ?2",
        &[&kind.key(), &month],
    )
}
