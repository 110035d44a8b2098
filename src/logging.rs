//! Tracing subscriber setup for the binary.

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `verbose` lowers the filter to debug.
pub fn init(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tidemark=debug")
    } else {
        EnvFilter::new("tidemark=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}
