//! Error types for tidemark

use thiserror::Error;

/// Main error type for tidemark operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ledger error: {0}")]
    Ledger(#[from] rusqlite::Error),

    #[error("Scan failed at {path}: {source}")]
    Scan {
        path: String,
        source: std::io::Error,
    },

    #[error("Cannot read source file {path}: {source}")]
    SourceUnreadable {
        path: String,
        source: std::io::Error,
    },

    #[error("Blob write failed for {fingerprint}: {source}")]
    StoreWrite {
        fingerprint: String,
        source: std::io::Error,
    },

    #[error("Blob not found: {fingerprint}")]
    BlobNotFound { fingerprint: String },
}

/// Result type alias for tidemark operations
pub type Result<T> = std::result::Result<T, Error>;
