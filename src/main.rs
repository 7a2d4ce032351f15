//! serving-bench CLI
//!
//! Command-line interface for benchmarking online serving throughput.

use anyhow::Result;
use clap::Parser;
use serving_bench::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    cli.run().await?;

    Ok(())
}
