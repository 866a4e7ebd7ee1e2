use super::LedgerStore;
use crate::error::{Result, ScraperError};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed ledger. Several ledgers share one database file, each in
/// its own namespace.
pub struct SqliteLedger {
    conn: Mutex<Connection>,
    namespace: String,
}

impl SqliteLedger {
    pub fn open<P: AsRef<Path>>(db_path: P, namespace: &str) -> Result<Self> {
        if let Some(parent) = db_path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(db_path.as_ref())?;
        conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            CREATE TABLE IF NOT EXISTS ledger_entries (
                ledger      TEXT NOT NULL,
                entry_key   TEXT NOT NULL,
                entry_value TEXT NOT NULL,
                created_at  INTEGER NOT NULL,
                PRIMARY KEY (ledger, entry_key)
            );
            "#,
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
            namespace: namespace.to_string(),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| ScraperError::Ledger("sqlite connection mutex poisoned".into()))
    }
}

impl LedgerStore for SqliteLedger {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT entry_value FROM ledger_entries WHERE ledger = ?1 AND entry_key = ?2",
        )?;
        let mut rows = stmt.query(params![self.namespace, key])?;
        if let Some(row) = rows.next()? {
            let value: String = row.get(0)?;
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    // INSERT OR IGNORE keeps the first value written for a key
    fn put(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO ledger_entries (ledger, entry_key, entry_value, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![self.namespace, key, value, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }

    fn values(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT entry_value FROM ledger_entries WHERE ledger = ?1 ORDER BY rowid",
        )?;
        let mut rows = stmt.query(params![self.namespace])?;
        let mut values = Vec::new();
        while let Some(row) = rows.next()? {
            values.push(row.get(0)?);
        }
        Ok(values)
    }
}
