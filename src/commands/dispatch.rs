//! Command dispatch logic for ctxopt

use std::time::Instant;

use tracing::debug;

use ctxopt_core::error::Result;

use crate::cli::{Cli, Commands};
use crate::commands;

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let result = match &cli.command {
        Commands::Analyze { file } => commands::analyze::execute(cli, file),

        Commands::Issues { file, source } => commands::issues::execute(cli, file, *source),

        Commands::Plan {
            file,
            strategy,
            source,
        } => commands::plan::execute(cli, file, *strategy, *source),

        Commands::Apply {
            file,
            strategy,
            source,
            dry_run,
        } => commands::apply::execute(cli, file, *strategy, *source, *dry_run),

        Commands::Archives { file } => commands::archives::execute(cli, file),
    };

    debug!(elapsed = ?start.elapsed(), "dispatch");
    result
}
