//! Content fingerprints: BLAKE3 over a file's basename followed by its bytes.

use crate::Result;
use blake3::Hasher;
use std::fs::File;
use std::io;
use std::path::Path;

/// Digest identifying one stored version of one file name.
///
/// The basename is hashed in front of the content, so identical bytes under
/// different file names produce different fingerprints, while repeated
/// backups of an unchanged file collapse to one value. Blob directories are
/// keyed by this digest, which means every path referencing a given
/// fingerprint agrees on the blob's file name.
pub fn fingerprint(basename: &str, bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(basename.as_bytes());
    hasher.update(bytes);
    hex::encode(hasher.finalize().as_bytes())
}

/// Streaming variant of [`fingerprint`] for files on disk.
pub fn fingerprint_file<P: AsRef<Path>>(basename: &str, path: P) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Hasher::new();
    hasher.update(basename.as_bytes());
    io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize().as_bytes()))
}

/// Final segment of a relative path, the name a blob is stored under.
pub fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}
