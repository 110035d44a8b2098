//! History command implementation.

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Args;
use std::path::PathBuf;

use crate::ledger::Ledger;

/// Arguments for the history command
#[derive(Args)]
pub struct HistoryArgs {
    /// History ledger database file
    #[arg(short, long)]
    pub ledger: PathBuf,

    /// Only events recorded for this relative path
    #[arg(short, long)]
    pub path: Option<String>,

    /// Maximum number of events to list
    #[arg(long, default_value = "50")]
    pub limit: i64,
}

/// Run the history command
pub fn run(args: HistoryArgs) -> anyhow::Result<()> {
    let ledger = Ledger::open(&args.ledger)
        .with_context(|| format!("cannot open ledger {}", args.ledger.display()))?;

    let records = ledger.history(args.path.as_deref(), args.limit)?;
    if records.is_empty() {
        println!("No recorded events");
        return Ok(());
    }

    for record in &records {
        let event: DateTime<Utc> = DateTime::from_timestamp_nanos(record.event_ts);
        let short = record.fingerprint.get(..12).unwrap_or(&record.fingerprint);
        let mtime = record
            .modified
            .map(|m| m.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {}  mtime {}  {}",
            event.to_rfc3339(),
            short,
            mtime,
            record.path
        );
    }

    Ok(())
}
