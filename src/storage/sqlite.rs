//! SQLite-backed result store.
//!
//! One append-only table, indexed by host and by port. Schema bootstrap is
//! idempotent; a batch of results commits in a single transaction or not at
//! all.

use crate::error::{StoreError, StoreResult};
use crate::scanner::ScanResult;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::debug;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS scans (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    ip TEXT NOT NULL,
    port INTEGER NOT NULL,
    is_open INTEGER NOT NULL,
    service TEXT,
    banner TEXT,
    scanned_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_scans_ip ON scans (ip);
CREATE INDEX IF NOT EXISTS idx_scans_port ON scans (port);
CREATE INDEX IF NOT EXISTS idx_scans_ip_port ON scans (ip, port);
"#;

/// Scan result store backed by SQLite.
pub struct ScanStore {
    conn: Connection,
}

impl ScanStore {
    /// Open (or create) the store at the given path and bootstrap the
    /// schema. Safe to call on every run.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Append results as rows, all inside one transaction.
    pub fn save(&mut self, results: &[ScanResult]) -> StoreResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO scans (ip, port, is_open, service, banner, scanned_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for result in results {
                stmt.execute(params![
                    result.ip,
                    result.port,
                    result.is_open as i64,
                    result.service,
                    result.banner,
                    result.scanned_at.to_rfc3339(),
                ])?;
            }
        }
        tx.commit()?;
        debug!(rows = results.len(), "saved scan results");
        Ok(())
    }

    /// The `limit` most recently inserted rows, most recent first.
    pub fn last(&self, limit: usize) -> StoreResult<Vec<ScanResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT ip, port, is_open, service, banner, scanned_at
             FROM scans ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt
            .query_map([limit as i64], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, u16>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(ip, port, is_open, service, banner, scanned_at)| {
                Ok(ScanResult {
                    ip,
                    port,
                    is_open: is_open != 0,
                    service,
                    banner,
                    scanned_at: parse_timestamp(&scanned_at)?,
                })
            })
            .collect()
    }
}

fn parse_timestamp(text: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| StoreError::InvalidTimestamp(text.to_string()))
}

/// Create the backing schema at `path` if absent. Idempotent.
pub fn init_db(path: impl AsRef<Path>) -> StoreResult<()> {
    ScanStore::open(path).map(|_| ())
}

/// Append `results` to the store at `path` in one atomic batch.
pub fn save_results(path: impl AsRef<Path>, results: &[ScanResult]) -> StoreResult<()> {
    ScanStore::open(path)?.save(results)
}

/// Retrieve the `limit` most recently inserted results, most recent first.
pub fn get_last(path: impl AsRef<Path>, limit: usize) -> StoreResult<Vec<ScanResult>> {
    ScanStore::open(path)?.last(limit)
}
