//! Change detection against the ledger's latest entries.

use crate::fingerprint::{basename, fingerprint_file};
use crate::ledger::Ledger;
use crate::scanner::SourceFile;
use crate::Result;
use std::path::Path;
use tracing::debug;

/// A file the detector decided needs a new backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangedFile {
    pub path: String,
    pub modified: i64,
    /// Digest seen during detection. `None` when the file could not be
    /// read; the backup pass retries it and reports the failure.
    pub fingerprint: Option<String>,
}

/// Select the files whose content the ledger does not already reflect.
///
/// Per file: no history at all means it is new and is included. A stored
/// modification time equal to the current one means unchanged, skipped
/// without reading a byte; an edit that preserves the timestamp goes
/// unnoticed until the timestamp moves. A moved timestamp forces a re-hash,
/// and the file is included only if the digest actually differs, so a bare
/// touch adds nothing. Reads only: the ledger and store are never written,
/// and a stale stored timestamp stays stale until a later backup records a
/// real change.
pub fn changed_files(
    ledger: &Ledger,
    files: &[SourceFile],
    source_root: &Path,
) -> Result<Vec<ChangedFile>> {
    let mut changed = Vec::new();

    for file in files {
        match ledger.latest(&file.path)? {
            None => changed.push(ChangedFile {
                path: file.path.clone(),
                modified: file.modified,
                fingerprint: probe(source_root, &file.path),
            }),
            Some(last) => {
                if last.modified == Some(file.modified) {
                    continue;
                }
                match probe(source_root, &file.path) {
                    Some(digest) if digest == last.fingerprint => {
                        debug!("{} touched but content unchanged", file.path);
                    }
                    digest => changed.push(ChangedFile {
                        path: file.path.clone(),
                        modified: file.modified,
                        fingerprint: digest,
                    }),
                }
            }
        }
    }

    Ok(changed)
}

/// Digest of the live file, or `None` when it cannot be read right now.
fn probe(source_root: &Path, path: &str) -> Option<String> {
    match fingerprint_file(basename(path), source_root.join(path)) {
        Ok(digest) => Some(digest),
        Err(e) => {
            debug!("cannot hash {} during detection: {}", path, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;
    use crate::scanner;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> Result<(TempDir, Ledger)> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("file1"), "hello1")?;
        fs::write(dir.path().join("file2"), "hello2")?;
        Ok((dir, Ledger::open_in_memory()?))
    }

    fn record_all(dir: &TempDir, ledger: &Ledger, mtime_offset: i64) -> Result<()> {
        for file in scanner::scan(dir.path())? {
            let bytes = fs::read(dir.path().join(&file.path))?;
            let digest = fingerprint(basename(&file.path), &bytes);
            ledger.append(&file.path, 1, &digest, Some(file.modified + mtime_offset))?;
        }
        Ok(())
    }

    #[test]
    fn test_new_files_are_included_with_digests() -> Result<()> {
        let (dir, ledger) = fixture()?;
        let files = scanner::scan(dir.path())?;

        let changed = changed_files(&ledger, &files, dir.path())?;
        assert_eq!(changed.len(), 2);
        assert_eq!(
            changed[0].fingerprint.as_deref(),
            Some(fingerprint("file1", b"hello1").as_str())
        );
        Ok(())
    }

    #[test]
    fn test_recorded_mtime_match_skips_without_hashing() -> Result<()> {
        let (dir, ledger) = fixture()?;
        record_all(&dir, &ledger, 0)?;

        let files = scanner::scan(dir.path())?;
        assert!(changed_files(&ledger, &files, dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_touch_without_edit_is_excluded() -> Result<()> {
        let (dir, ledger) = fixture()?;
        // Stored mtimes differ from the current ones, content does not.
        record_all(&dir, &ledger, -10)?;

        let files = scanner::scan(dir.path())?;
        assert!(changed_files(&ledger, &files, dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_edit_with_new_mtime_is_detected() -> Result<()> {
        let (dir, ledger) = fixture()?;
        record_all(&dir, &ledger, -10)?;
        fs::write(dir.path().join("file1"), "hello1 edited")?;

        let files = scanner::scan(dir.path())?;
        let changed = changed_files(&ledger, &files, dir.path())?;
        assert_eq!(changed.len(), 1);
        assert_eq!(changed[0].path, "file1");
        assert_eq!(
            changed[0].fingerprint.as_deref(),
            Some(fingerprint("file1", b"hello1 edited").as_str())
        );
        Ok(())
    }

    #[test]
    fn test_mtime_preserving_edit_is_missed() -> Result<()> {
        let (dir, ledger) = fixture()?;
        // Records claim the current mtimes but some other content.
        for file in scanner::scan(dir.path())? {
            ledger.append(&file.path, 1, "a-superseded-digest", Some(file.modified))?;
        }

        let files = scanner::scan(dir.path())?;
        assert!(changed_files(&ledger, &files, dir.path())?.is_empty());
        Ok(())
    }
}
