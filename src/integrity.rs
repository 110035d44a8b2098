//! Archive verification over the full ledger history.

use crate::fingerprint::{self, basename};
use crate::ledger::Ledger;
use crate::store::BlobStore;
use crate::Result;
use tracing::debug;

/// Verify every history record against the store, returning the paths of
/// records whose blob is missing, unreadable, or no longer matching its
/// recorded fingerprint.
///
/// Iteration covers all records, not just the latest per path, so a path
/// with several damaged versions appears once per damaged record.
pub fn check(ledger: &Ledger, store: &BlobStore) -> Result<Vec<String>> {
    let mut problems = Vec::new();

    for record in ledger.all_records()? {
        let name = basename(&record.path);
        match store.get(&record.fingerprint, name) {
            Ok(bytes) => {
                if fingerprint::fingerprint(name, &bytes) != record.fingerprint {
                    debug!("{} drifted from its recorded fingerprint", record.path);
                    problems.push(record.path);
                }
            }
            Err(e) => {
                debug!("{}: {}", record.path, e);
                problems.push(record.path);
            }
        }
    }

    Ok(problems)
}
