//! NoahAid CLI — first-aid guidance from keyword lookups.
//!
//! Type what happened; NoahAid answers with the matching first-aid
//! procedure, one step at a time.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
