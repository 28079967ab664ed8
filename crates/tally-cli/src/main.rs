//! Tally CLI - Expense categorization and analysis
//!
//! Usage:
//!   tally check                 Show categories and model backend health
//!   tally classify --file CSV   Categorize transactions
//!   tally train --file CSV      Train the statistical model
//!   tally analyze --file CSV    Spending report

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Check => commands::cmd_check().await,
        Commands::Classify {
            file,
            output,
            strategy,
            concurrency,
        } => commands::cmd_classify(&file, output.as_deref(), &strategy, concurrency).await,
        Commands::Train { file } => commands::cmd_train(&file),
        Commands::Analyze { file, json } => commands::cmd_analyze(&file, json),
    }
}
