use std::path::Path;

use rusqlite::Connection;
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::ledger::{persist_records, ImportBatch, PersistResult};
use crate::session::{ImportReport, ImportSession};
use crate::source::open_source;

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub csv_delimiter: Option<u8>,
    /// Parse and report only; nothing is written.
    pub dry_run: bool,
    /// Import even if this exact file was imported before.
    pub force: bool,
}

pub struct ImportOutcome {
    pub report: ImportReport,
    pub persisted: Option<PersistResult>,
    pub duplicate_file: bool,
}

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

fn is_duplicate_file(conn: &Connection, checksum: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
    Ok(stmt.exists([checksum])?)
}

fn record_import(conn: &Connection, file_path: &Path, report: &ImportReport, checksum: &str) -> Result<i64> {
    let range = report.date_range();
    conn.execute(
        "INSERT INTO imports (filename, record_count, date_range_start, date_range_end, checksum) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![
            file_path.file_name().and_then(|n| n.to_str()).unwrap_or(""),
            report.imported() as i64,
            range.map(|r| r.0),
            range.map(|r| r.1),
            checksum,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Run one import session over a file without touching the ledger.
pub fn read_file(file_path: &Path, csv_delimiter: Option<u8>) -> Result<ImportReport> {
    let source = open_source(file_path, csv_delimiter)?;
    tracing::info!(file = %file_path.display(), "importing");
    ImportSession::new().run(source)
}

pub fn import_file(conn: &Connection, file_path: &Path, options: ImportOptions) -> Result<ImportOutcome> {
    let checksum = compute_checksum(file_path)?;
    if !options.force && is_duplicate_file(conn, &checksum)? {
        return Ok(ImportOutcome {
            report: ImportReport::default(),
            persisted: None,
            duplicate_file: true,
        });
    }

    let report = read_file(file_path, options.csv_delimiter)?;
    if options.dry_run {
        return Ok(ImportOutcome {
            report,
            persisted: None,
            duplicate_file: false,
        });
    }

    let import_id = record_import(conn, file_path, &report, &checksum)?;
    let persisted = persist_records(&ImportBatch { conn, import_id }, &report.transactions);
    Ok(ImportOutcome {
        report,
        persisted: Some(persisted),
        duplicate_file: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};
    use crate::ledger::list_all;

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn write_statement(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        let content = "\
Controle financeiro;;;;;;
DATA;;TIPO;DESCRIÇÃO;VALOR;PAGAMENTO;OBS
01/03/2024;;ENTRADA;Salário;R$ 1.000,00;PIX;
;;SAIDA;Aluguel;500,00;DINHEIRO;março
;;;;;;
TOTAL;;;;1.500,00;;
02/03/2024;;SAIDA;Mercado;abc;DINHEIRO;
2024-03-05;;SAIDA;Farmácia;45,90;cartão de crédito;
";
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_import_file_inserts_transactions() {
        let (dir, conn) = test_db();
        let path = write_statement(dir.path(), "marco.csv");
        let outcome = import_file(&conn, &path, ImportOptions::default()).unwrap();
        assert!(!outcome.duplicate_file);
        assert_eq!(outcome.report.rows_processed, 8);
        assert_eq!(outcome.report.header_rows_consumed, 1);
        assert_eq!(outcome.report.rows_skipped, 2);
        assert_eq!(outcome.report.imported(), 3);
        assert_eq!(outcome.persisted, Some(PersistResult { inserted: 3, failed: 0 }));

        let stored = list_all(&conn).unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[1].record.note, "março");
        assert!(stored.iter().all(|t| t.import_id.is_some()));
    }

    #[test]
    fn test_import_file_detects_file_duplicate() {
        let (dir, conn) = test_db();
        let path = write_statement(dir.path(), "marco.csv");
        import_file(&conn, &path, ImportOptions::default()).unwrap();
        let again = import_file(&conn, &path, ImportOptions::default()).unwrap();
        assert!(again.duplicate_file);
        assert_eq!(list_all(&conn).unwrap().len(), 3);

        let forced = import_file(&conn, &path, ImportOptions { force: true, ..Default::default() }).unwrap();
        assert!(!forced.duplicate_file);
        assert_eq!(list_all(&conn).unwrap().len(), 6);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (dir, conn) = test_db();
        let path = write_statement(dir.path(), "marco.csv");
        let outcome = import_file(&conn, &path, ImportOptions { dry_run: true, ..Default::default() }).unwrap();
        assert_eq!(outcome.report.imported(), 3);
        assert!(outcome.persisted.is_none());
        assert!(list_all(&conn).unwrap().is_empty());
        let imports: i64 = conn.query_row("SELECT count(*) FROM imports", [], |r| r.get(0)).unwrap();
        assert_eq!(imports, 0);
    }

    #[test]
    fn test_import_records_batch() {
        let (dir, conn) = test_db();
        let path = write_statement(dir.path(), "marco.csv");
        import_file(&conn, &path, ImportOptions::default()).unwrap();
        let (count, start, end): (i64, String, String) = conn
            .query_row(
                "SELECT record_count, date_range_start, date_range_end FROM imports LIMIT 1",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(start, "2024-03-01");
        assert_eq!(end, "2024-03-05");
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let (dir, conn) = test_db();
        assert!(import_file(&conn, &dir.path().join("nope.csv"), ImportOptions::default()).is_err());
    }
}
