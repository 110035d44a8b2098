//! Backup orchestration: scratch copy, fingerprint, store, record.
//!
//! A run assumes exclusive access to the archive and ledger; concurrent
//! runs against the same archive are not coordinated.

use crate::detect::ChangedFile;
use crate::fingerprint::{self, basename};
use crate::ledger::{HistoryRecord, Ledger};
use crate::store::BlobStore;
use crate::{Error, Result};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;
use uuid::Uuid;

const SCRATCH_DIR: &str = ".scratch";

/// Nanosecond wall clock forced strictly increasing within one run.
///
/// Two appends from one run must never share a timestamp; snapshot queries
/// take `MAX(event_ts)` per path and a tie would make the snapshot
/// ambiguous.
pub struct EventClock {
    last: i64,
}

impl EventClock {
    pub fn new() -> Self {
        Self { last: 0 }
    }

    /// Current wall clock, bumped past the previous reading if the clock
    /// has not advanced.
    pub fn next(&mut self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0);
        self.last = now.max(self.last + 1);
        self.last
    }
}

impl Default for EventClock {
    fn default() -> Self {
        Self::new()
    }
}

/// One candidate that could not be backed up.
#[derive(Debug)]
pub struct SkippedFile {
    pub path: String,
    pub reason: String,
}

/// Outcome of one backup run.
#[derive(Debug, Default)]
pub struct BackupReport {
    /// Ledger rows appended by this run, in processing order.
    pub recorded: Vec<HistoryRecord>,
    /// Candidates that failed, with reasons.
    pub skipped: Vec<SkippedFile>,
    /// Blobs physically written; dedup hits do not count.
    pub blobs_written: usize,
}

/// Back up every candidate, isolating per-file failures.
///
/// Each file is copied into a scratch directory under the archive before
/// hashing, so the bytes fingerprinted and stored are a stable snapshot
/// rather than the live file. A file that cannot be copied or stored lands
/// in the skip list and the run moves on; a ledger append failure ends the
/// run.
pub fn run(
    ledger: &Ledger,
    store: &BlobStore,
    source_root: &Path,
    changed: &[ChangedFile],
) -> Result<BackupReport> {
    let scratch_root = store.root().join(SCRATCH_DIR);
    // Scratch from an interrupted earlier run is cleared before this one
    // stages its own copies.
    let _ = fs::remove_dir_all(&scratch_root);
    let scratch_dir = scratch_root.join(Uuid::new_v4().to_string());
    fs::create_dir_all(&scratch_dir)?;

    let outcome = run_with_scratch(ledger, store, source_root, changed, &scratch_dir);
    let _ = fs::remove_dir_all(&scratch_dir);
    outcome
}

fn run_with_scratch(
    ledger: &Ledger,
    store: &BlobStore,
    source_root: &Path,
    changed: &[ChangedFile],
    scratch_dir: &Path,
) -> Result<BackupReport> {
    let mut report = BackupReport::default();
    let mut clock = EventClock::new();

    for file in changed {
        let (digest, stored) = match snapshot_one(store, source_root, scratch_dir, file) {
            Ok(result) => result,
            Err(e) => {
                debug!("skipping {}: {}", file.path, e);
                report.skipped.push(SkippedFile {
                    path: file.path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if stored {
            report.blobs_written += 1;
        }

        let event_ts = clock.next();
        let id = ledger.append(&file.path, event_ts, &digest, Some(file.modified))?;
        report.recorded.push(HistoryRecord {
            id,
            path: file.path.clone(),
            event_ts,
            fingerprint: digest,
            modified: Some(file.modified),
        });
    }

    debug!(
        "run complete: {} recorded, {} new blobs, {} skipped",
        report.recorded.len(),
        report.blobs_written,
        report.skipped.len()
    );
    Ok(report)
}

/// Copy one source file to scratch, fingerprint the copy, store it.
fn snapshot_one(
    store: &BlobStore,
    source_root: &Path,
    scratch_dir: &Path,
    file: &ChangedFile,
) -> Result<(String, bool)> {
    let name = basename(&file.path);
    let scratch_path = scratch_dir.join(name);

    fs::copy(source_root.join(&file.path), &scratch_path).map_err(|source| {
        Error::SourceUnreadable {
            path: file.path.clone(),
            source,
        }
    })?;

    let bytes = fs::read(&scratch_path)?;
    let digest = fingerprint::fingerprint(name, &bytes);
    let stored = store.put(&digest, name, &bytes)?;
    Ok((digest, stored))
}
