//! ProfileScout CLI — batch candidate-profile screening tool.
//!
//! Reads a CSV of candidate LinkedIn profiles, enriches and scores each
//! one, and writes a ranked report with a top-candidates summary.

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
