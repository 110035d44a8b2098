//! Recursive enumeration of a source tree.

use crate::{Error, Result};
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// A regular file found under the scanned root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the root, in OS-native form.
    pub path: String,
    /// Modification time, whole seconds since the Unix epoch.
    pub modified: i64,
}

/// Collect every regular file under `root`.
///
/// An unreadable directory or entry fails the whole scan; callers never see
/// a partial listing. Entries are visited sorted by name within each
/// directory, so a fixed fixture always scans in the same order.
pub fn scan<P: AsRef<Path>>(root: P) -> Result<Vec<SourceFile>> {
    let root = root.as_ref();
    let mut files = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| scan_error(root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry.metadata().map_err(|e| scan_error(root, e))?;
        let modified = metadata
            .modified()
            .map_err(|source| Error::Scan {
                path: entry.path().display().to_string(),
                source,
            })?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        files.push(SourceFile {
            path: relative.to_string_lossy().to_string(),
            modified,
        });
    }

    Ok(files)
}

fn scan_error(root: &Path, e: walkdir::Error) -> Error {
    let path = e.path().unwrap_or(root).display().to_string();
    let source = e
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop"));
    Error::Scan { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lists_files_recursively_with_relative_paths() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("file1"), "hello1")?;
        fs::write(dir.path().join("file2"), "hello2")?;
        fs::create_dir(dir.path().join("dir"))?;
        fs::write(dir.path().join("dir").join("file3"), "hello3")?;

        let files = scan(dir.path())?;
        let paths: Vec<String> = files.iter().map(|f| f.path.clone()).collect();
        let expected = vec![
            Path::new("dir").join("file3").to_string_lossy().to_string(),
            "file1".to_string(),
            "file2".to_string(),
        ];
        assert_eq!(paths, expected);
        assert!(files.iter().all(|f| f.modified > 0));
        Ok(())
    }

    #[test]
    fn test_empty_tree_yields_no_files() -> Result<()> {
        let dir = TempDir::new()?;
        assert!(scan(dir.path())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_scan_errors_name_the_offending_path() {
        let result = scan(Path::new("/nonexistent/backup/source"));
        match result {
            Err(Error::Scan { path, .. }) => assert!(path.contains("nonexistent")),
            other => panic!("expected a scan error, got {:?}", other),
        }
    }
}
