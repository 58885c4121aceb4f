//! Hexbridge CLI — hex-crawl content bridge.
//!
//! Pulls location pages out of the hex-crawl map app, turns them into
//! journal entries in a target-app bundle, and backfills hex notes with
//! stable references.

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
