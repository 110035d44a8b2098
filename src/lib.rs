//! # Tidemark
//!
//! Incremental file backup with a content-addressed archive and an
//! append-only history ledger.
//!
//! A backup run walks the source tree, asks the ledger which files have
//! genuinely changed (skipping the hash when the recorded modification time
//! still matches), snapshots each changed file into a scratch copy, stores
//! its bytes under a fingerprint of basename plus content, and appends one
//! immutable history record. Because the ledger is never updated in place,
//! "what is current" and "what existed at instant T" are both plain
//! queries, and any past state of the tree can be rebuilt.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tidemark::ledger::Ledger;
//! use tidemark::store::BlobStore;
//! use tidemark::{backup, detect, scanner};
//! use std::path::Path;
//!
//! # fn main() -> tidemark::Result<()> {
//! let source = Path::new("./my-data");
//! let ledger = Ledger::open("./archive/history.db")?;
//! let store = BlobStore::open("./archive")?;
//!
//! let files = scanner::scan(source)?;
//! let changed = detect::changed_files(&ledger, &files, source)?;
//! let report = backup::run(&ledger, &store, source, &changed)?;
//! println!("backed up {} files", report.recorded.len());
//! # Ok(())
//! # }
//! ```

pub mod backup;
pub mod cli;
pub mod detect;
pub mod error;
pub mod fingerprint;
pub mod integrity;
pub mod ledger;
pub mod logging;
pub mod restore;
pub mod scanner;
pub mod store;

// Re-export commonly used types
pub use error::{Error, Result};
pub use ledger::{HistoryRecord, Ledger};
pub use store::BlobStore;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
