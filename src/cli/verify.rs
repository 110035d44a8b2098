//! Verify command implementation.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;

use crate::integrity;
use crate::ledger::Ledger;
use crate::store::BlobStore;

/// Arguments for the verify command
#[derive(Args)]
pub struct VerifyArgs {
    /// Archive directory holding the blobs
    #[arg(short, long)]
    pub archive: PathBuf,

    /// History ledger database file
    #[arg(short, long)]
    pub ledger: PathBuf,
}

/// Run the verify command
pub fn run(args: VerifyArgs) -> anyhow::Result<()> {
    let ledger = Ledger::open(&args.ledger)
        .with_context(|| format!("cannot open ledger {}", args.ledger.display()))?;
    let store = BlobStore::open(&args.archive)
        .with_context(|| format!("cannot open archive {}", args.archive.display()))?;

    let problems = integrity::check(&ledger, &store)?;
    if problems.is_empty() {
        println!("ok: every record matches its blob");
    } else {
        println!("{} bad records:", problems.len());
        for path in &problems {
            println!("  {}", path);
        }
    }

    Ok(())
}
