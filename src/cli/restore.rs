//! Restore command implementation.

use anyhow::Context;
use chrono::DateTime;
use clap::Args;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ledger::Ledger;
use crate::restore;
use crate::store::BlobStore;

/// Arguments for the restore command
#[derive(Args)]
pub struct RestoreArgs {
    /// Archive directory holding the blobs
    #[arg(short, long)]
    pub archive: PathBuf,

    /// History ledger database file
    #[arg(short, long)]
    pub ledger: PathBuf,

    /// Destination directory for the restored tree
    #[arg(short, long)]
    pub output: PathBuf,

    /// Rebuild the tree as of this RFC 3339 instant (default: now)
    #[arg(long)]
    pub as_of: Option<String>,
}

/// Run the restore command
pub fn run(args: RestoreArgs) -> anyhow::Result<()> {
    let cutoff_ns = match &args.as_of {
        Some(instant) => DateTime::parse_from_rfc3339(instant)
            .with_context(|| format!("invalid --as-of instant: {}", instant))?
            .timestamp_nanos_opt()
            .context("--as-of instant is out of range")?,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as i64)
            .unwrap_or(0),
    };

    let ledger = Ledger::open(&args.ledger)
        .with_context(|| format!("cannot open ledger {}", args.ledger.display()))?;
    let store = BlobStore::open(&args.archive)
        .with_context(|| format!("cannot open archive {}", args.archive.display()))?;

    let records = ledger.snapshot_as_of(cutoff_ns)?;
    if records.is_empty() {
        println!("Nothing recorded at or before the requested instant");
        return Ok(());
    }

    let report = restore::run(&records, &store, &args.output)?;

    println!(
        "Restored {} files into {}",
        report.restored,
        args.output.display()
    );
    if !report.failed.is_empty() {
        println!("Failed {} files:", report.failed.len());
        for failure in &report.failed {
            println!("  {}: {}", failure.path, failure.reason);
        }
    }

    Ok(())
}
