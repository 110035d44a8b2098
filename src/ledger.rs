//! Append-only history ledger over SQLite.
//!
//! Every backup event is one immutable row. "Current state" and "state as
//! of T" are both derived queries over the same log; no row is ever updated
//! or deleted.

use crate::Result;
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::debug;

/// One immutable ledger entry: a path observed with some content at some
/// instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub id: i64,
    pub path: String,
    /// Backup event time, nanoseconds since the Unix epoch.
    pub event_ts: i64,
    pub fingerprint: String,
    /// Source file modification time at backup, whole seconds.
    pub modified: Option<i64>,
}

/// Append-only store of backup events, one row per observed file version.
pub struct Ledger {
    conn: Connection,
}

impl Ledger {
    /// Open (or create) the ledger database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let ledger = Ledger { conn };
        ledger.configure_pragmas()?;
        ledger.init_schema()?;
        Ok(ledger)
    }

    /// In-memory ledger, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let ledger = Ledger { conn };
        ledger.configure_pragmas()?;
        ledger.init_schema()?;
        Ok(ledger)
    }

    fn configure_pragmas(&self) -> rusqlite::Result<()> {
        // FULL sync: each accepted file's record must survive a crash
        // immediately after its insert.
        self.conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;
             PRAGMA busy_timeout = 5000;",
        )?;
        debug!("ledger pragmas configured (WAL, full sync)");
        Ok(())
    }

    fn init_schema(&self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS file_history (
                 id          INTEGER PRIMARY KEY AUTOINCREMENT,
                 path        TEXT NOT NULL,
                 event_ts    INTEGER NOT NULL,
                 fingerprint TEXT NOT NULL,
                 modified    INTEGER
             );
             CREATE INDEX IF NOT EXISTS idx_history_path_ts
                 ON file_history (path, event_ts DESC);",
        )?;
        Ok(())
    }

    /// Append one backup event and return the new row's id.
    pub fn append(
        &self,
        path: &str,
        event_ts: i64,
        fingerprint: &str,
        modified: Option<i64>,
    ) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO file_history (path, event_ts, fingerprint, modified)
             VALUES (?1, ?2, ?3, ?4)",
            params![path, event_ts, fingerprint, modified],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// The record with the greatest event timestamp for `path`, if any.
    pub fn latest(&self, path: &str) -> Result<Option<HistoryRecord>> {
        match self.conn.query_row(
            "SELECT id, path, event_ts, fingerprint, modified
             FROM file_history
             WHERE path = ?1
             ORDER BY event_ts DESC
             LIMIT 1",
            params![path],
            decode_record,
        ) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Every record, in insertion order.
    pub fn all_records(&self) -> Result<Vec<HistoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, path, event_ts, fingerprint, modified
             FROM file_history
             ORDER BY id",
        )?;
        let records = stmt
            .query_map([], decode_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// The newest record per path at or before `cutoff_ns`: the tree as it
    /// was observed at that instant. Paths first recorded after the cutoff
    /// are absent.
    pub fn snapshot_as_of(&self, cutoff_ns: i64) -> Result<Vec<HistoryRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT fh.id, fh.path, fh.event_ts, fh.fingerprint, fh.modified
             FROM file_history fh
             JOIN (
                 SELECT path, MAX(event_ts) AS max_ts
                 FROM file_history
                 WHERE event_ts <= ?1
                 GROUP BY path
             ) newest ON newest.path = fh.path AND newest.max_ts = fh.event_ts
             ORDER BY fh.path",
        )?;
        let records = stmt
            .query_map(params![cutoff_ns], decode_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Recent records, newest first, optionally narrowed to one path.
    pub fn history(&self, path: Option<&str>, limit: i64) -> Result<Vec<HistoryRecord>> {
        match path {
            Some(path) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, path, event_ts, fingerprint, modified
                     FROM file_history
                     WHERE path = ?1
                     ORDER BY event_ts DESC
                     LIMIT ?2",
                )?;
                let records = stmt
                    .query_map(params![path, limit], decode_record)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, path, event_ts, fingerprint, modified
                     FROM file_history
                     ORDER BY event_ts DESC
                     LIMIT ?1",
                )?;
                let records = stmt
                    .query_map(params![limit], decode_record)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            }
        }
    }
}

/// Row-to-record decode, applied at each query boundary.
fn decode_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryRecord> {
    Ok(HistoryRecord {
        id: row.get(0)?,
        path: row.get(1)?,
        event_ts: row.get(2)?,
        fingerprint: row.get(3)?,
        modified: row.get(4)?,
    })
}
