//! Command implementations

mod check;
mod config;
mod inspect;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match cli.command {
        Commands::Check(args) => check::execute(args, cli.config.as_deref(), &output).await,
        Commands::Inspect(args) => inspect::execute(args, &output).await,
        Commands::Config => config::execute(cli.config.as_deref(), &output),
    }
}
