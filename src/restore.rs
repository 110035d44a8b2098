//! Materialize a snapshot into a destination tree.

use crate::fingerprint::basename;
use crate::ledger::HistoryRecord;
use crate::store::BlobStore;
use crate::Result;
use std::fs;
use std::path::Path;
use tracing::debug;

/// One path that could not be restored.
#[derive(Debug)]
pub struct FailedRestore {
    pub path: String,
    pub reason: String,
}

/// Outcome of one restore run.
#[derive(Debug, Default)]
pub struct RestoreReport {
    pub restored: usize,
    pub failed: Vec<FailedRestore>,
}

/// Write each record's blob to `destination/<path>`, creating intermediate
/// directories as needed. Existing files at the destination are
/// overwritten. Per-path failures are collected, not fatal.
pub fn run(
    records: &[HistoryRecord],
    store: &BlobStore,
    destination: &Path,
) -> Result<RestoreReport> {
    fs::create_dir_all(destination)?;
    let mut report = RestoreReport::default();

    for record in records {
        match restore_file(record, store, destination) {
            Ok(()) => report.restored += 1,
            Err(e) => {
                debug!("cannot restore {}: {}", record.path, e);
                report.failed.push(FailedRestore {
                    path: record.path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(report)
}

fn restore_file(record: &HistoryRecord, store: &BlobStore, destination: &Path) -> Result<()> {
    let bytes = store.get(&record.fingerprint, basename(&record.path))?;
    let target = destination.join(&record.path);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&target, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;
    use crate::ledger::Ledger;
    use tempfile::TempDir;

    fn archive_with_history() -> Result<(TempDir, Ledger, BlobStore)> {
        let archive = TempDir::new()?;
        let store = BlobStore::open(archive.path())?;
        let ledger = Ledger::open_in_memory()?;

        let v1 = fingerprint("file1", b"hello1");
        store.put(&v1, "file1", b"hello1")?;
        ledger.append("file1", 100, &v1, Some(1))?;

        let nested = fingerprint("file3", b"hello3");
        store.put(&nested, "file3", b"hello3")?;
        ledger.append("dir/file3", 200, &nested, Some(2))?;

        let v2 = fingerprint("file1", b"hello1 v2");
        store.put(&v2, "file1", b"hello1 v2")?;
        ledger.append("file1", 300, &v2, Some(3))?;

        Ok((archive, ledger, store))
    }

    #[test]
    fn test_restore_latest_snapshot_round_trips() -> Result<()> {
        let (_archive, ledger, store) = archive_with_history()?;
        let dest = TempDir::new()?;

        let records = ledger.snapshot_as_of(1_000)?;
        let report = run(&records, &store, dest.path())?;

        assert_eq!(report.restored, 2);
        assert!(report.failed.is_empty());
        assert_eq!(fs::read(dest.path().join("file1"))?, b"hello1 v2");
        assert_eq!(fs::read(dest.path().join("dir").join("file3"))?, b"hello3");
        Ok(())
    }

    #[test]
    fn test_restore_intermediate_instant_picks_old_version() -> Result<()> {
        let (_archive, ledger, store) = archive_with_history()?;
        let dest = TempDir::new()?;

        let records = ledger.snapshot_as_of(250)?;
        run(&records, &store, dest.path())?;

        assert_eq!(fs::read(dest.path().join("file1"))?, b"hello1");
        assert_eq!(fs::read(dest.path().join("dir").join("file3"))?, b"hello3");
        Ok(())
    }

    #[test]
    fn test_path_first_recorded_after_cutoff_is_absent() -> Result<()> {
        let (_archive, ledger, store) = archive_with_history()?;
        let dest = TempDir::new()?;

        let records = ledger.snapshot_as_of(150)?;
        run(&records, &store, dest.path())?;

        assert_eq!(fs::read(dest.path().join("file1"))?, b"hello1");
        assert!(!dest.path().join("dir").join("file3").exists());
        Ok(())
    }

    #[test]
    fn test_restore_overwrites_existing_destination_files() -> Result<()> {
        let (_archive, ledger, store) = archive_with_history()?;
        let dest = TempDir::new()?;
        fs::write(dest.path().join("file1"), "stale local edit")?;

        let records = ledger.snapshot_as_of(1_000)?;
        run(&records, &store, dest.path())?;

        assert_eq!(fs::read(dest.path().join("file1"))?, b"hello1 v2");
        Ok(())
    }

    #[test]
    fn test_missing_blob_lands_in_failures() -> Result<()> {
        let (archive, ledger, store) = archive_with_history()?;
        let dest = TempDir::new()?;
        let v2 = fingerprint("file1", b"hello1 v2");
        fs::remove_dir_all(archive.path().join(&v2))?;

        let records = ledger.snapshot_as_of(1_000)?;
        let report = run(&records, &store, dest.path())?;

        assert_eq!(report.restored, 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, "file1");
        Ok(())
    }
}
