//! Content-addressed blob storage.
//!
//! Layout: `<root>/<fingerprint>/<basename>`, one file per fingerprint
//! directory, written once and never rewritten or deleted.

use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const STAGING_DIR: &str = ".staging";

/// Blob archive rooted at one directory.
#[derive(Debug)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    /// Open a store at `root`, creating the directory if needed. Staged
    /// blobs left behind by an interrupted run are swept out.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        let store = Self { root };
        store.sweep_staging()?;
        Ok(store)
    }

    /// Archive root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Store one blob. Returns `false` without touching anything when the
    /// fingerprint is already present.
    ///
    /// New blobs are staged in a hidden directory and renamed into place, so
    /// a concurrent reader sees either no blob directory or a complete one,
    /// never a partial write. Fingerprints are hex, so the staging directory
    /// cannot collide with one.
    pub fn put(&self, fingerprint: &str, basename: &str, bytes: &[u8]) -> Result<bool> {
        let blob_dir = self.blob_dir(fingerprint);
        if blob_dir.exists() {
            return Ok(false);
        }

        let stage_dir = self
            .root
            .join(STAGING_DIR)
            .join(Uuid::new_v4().to_string());

        let staged = write_staged(&stage_dir, basename, bytes).and_then(|()| {
            match fs::rename(&stage_dir, &blob_dir) {
                Ok(()) => Ok(true),
                // Another writer finished the same fingerprint first.
                Err(_) if blob_dir.exists() => Ok(false),
                Err(e) => Err(e),
            }
        });

        match staged {
            Ok(stored) => {
                if !stored {
                    let _ = fs::remove_dir_all(&stage_dir);
                }
                Ok(stored)
            }
            Err(source) => {
                let _ = fs::remove_dir_all(&stage_dir);
                Err(Error::StoreWrite {
                    fingerprint: fingerprint.to_string(),
                    source,
                })
            }
        }
    }

    /// Read a blob back, failing with a typed not-found when absent.
    pub fn get(&self, fingerprint: &str, basename: &str) -> Result<Vec<u8>> {
        let blob_path = self.blob_dir(fingerprint).join(basename);
        if !blob_path.exists() {
            return Err(Error::BlobNotFound {
                fingerprint: fingerprint.to_string(),
            });
        }
        Ok(fs::read(blob_path)?)
    }

    /// Whether a blob directory exists for `fingerprint`.
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.blob_dir(fingerprint).exists()
    }

    /// Remove stages from runs that died between write and rename. Runs
    /// have the archive to themselves, so anything still staged at open is
    /// leftover.
    fn sweep_staging(&self) -> Result<()> {
        let staging = self.root.join(STAGING_DIR);
        if staging.exists() {
            fs::remove_dir_all(&staging)?;
        }
        Ok(())
    }

    fn blob_dir(&self, fingerprint: &str) -> PathBuf {
        self.root.join(fingerprint)
    }
}

fn write_staged(stage_dir: &Path, basename: &str, bytes: &[u8]) -> io::Result<()> {
    fs::create_dir_all(stage_dir)?;
    let mut file = File::create(stage_dir.join(basename))?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}
