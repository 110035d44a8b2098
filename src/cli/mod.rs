//! Command-line interface for tidemark.
//!
//! One module per subcommand, clap derive for parsing.

use clap::{Parser, Subcommand};

pub mod backup;
pub mod history;
pub mod restore;
pub mod verify;

/// Tidemark - incremental backups with a complete history
#[derive(Parser)]
#[command(name = "tidemark")]
#[command(about = "Incremental file backup with a content-addressed archive and full history")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Show debug-level diagnostics
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Back up changed files from a source tree into an archive
    Backup(backup::BackupArgs),
    /// Verify every ledger record against the archive blobs
    Verify(verify::VerifyArgs),
    /// Rebuild the tree as of now or of a past instant
    Restore(restore::RestoreArgs),
    /// List recorded backup events
    History(history::HistoryArgs),
}
