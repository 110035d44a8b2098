//! Tidemark binary entry point.

use clap::Parser;
use tidemark::cli::{Cli, Commands};
use tidemark::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Backup(args) => tidemark::cli::backup::run(args),
        Commands::Verify(args) => tidemark::cli::verify::run(args),
        Commands::Restore(args) => tidemark::cli::restore::run(args),
        Commands::History(args) => tidemark::cli::history::run(args),
    }
}
