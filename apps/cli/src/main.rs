//! Freshwire CLI — web-source monitoring from the command line.
//!
//! Retrieves configured sources (pages, feeds, blog indexes), extracts their
//! content, and reports what is new since the last run.

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
