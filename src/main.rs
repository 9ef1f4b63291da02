//! api-bench - Controlled REST vs GraphQL performance experiments

use anyhow::Result;
use clap::Parser;

mod cli;
mod config;
mod logging;
mod progress;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.run().await
}
