//! Backup command implementation.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use crate::ledger::Ledger;
use crate::store::BlobStore;
use crate::{backup, detect, scanner};

/// Arguments for the backup command
#[derive(Args)]
pub struct BackupArgs {
    /// Source directory to back up
    #[arg(short, long)]
    pub source: PathBuf,

    /// Archive directory receiving the blobs
    #[arg(short, long)]
    pub archive: PathBuf,

    /// History ledger database file
    #[arg(short, long)]
    pub ledger: PathBuf,
}

/// Run the backup command
pub fn run(args: BackupArgs) -> anyhow::Result<()> {
    let ledger = Ledger::open(&args.ledger)
        .with_context(|| format!("cannot open ledger {}", args.ledger.display()))?;
    let store = BlobStore::open(&args.archive)
        .with_context(|| format!("cannot open archive {}", args.archive.display()))?;

    let files = scanner::scan(&args.source)
        .with_context(|| format!("cannot scan {}", args.source.display()))?;
    if files.is_empty() {
        println!("No files found under {}", args.source.display());
        return Ok(());
    }
    println!("Found {} files", files.len());

    let changed = detect::changed_files(&ledger, &files, &args.source)?;
    if changed.is_empty() {
        println!("Everything is already backed up");
        return Ok(());
    }

    let report = backup::run(&ledger, &store, &args.source, &changed)?;

    println!(
        "Backed up {} files ({} new blobs)",
        report.recorded.len(),
        report.blobs_written
    );
    if !report.skipped.is_empty() {
        println!("Skipped {} files:", report.skipped.len());
        for skip in &report.skipped {
            println!("  {}: {}", skip.path, skip.reason);
        }
    }

    Ok(())
}
