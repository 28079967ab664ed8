//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Categorize and analyze expense transactions
#[derive(Parser)]
#[command(name = "tally")]
#[command(
    about = "CSV expense categorizer with rule, statistical, and semantic engines",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show category configuration and model backend health
    Check,

    /// Categorize transactions from a CSV file
    Classify {
        /// CSV file to categorize
        #[arg(short, long)]
        file: PathBuf,

        /// Write the categorized CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Strategy: rule, statistical, or semantic
        #[arg(short, long, default_value = "rule")]
        strategy: String,

        /// Maximum in-flight model requests for semantic batches
        #[arg(short, long, default_value = "4")]
        concurrency: usize,
    },

    /// Train the statistical model and report held-out accuracy
    Train {
        /// Labeled CSV file to train on
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Summarize spending: totals, outliers, recurring payments, savings
    Analyze {
        /// CSV file to analyze
        #[arg(short, long)]
        file: PathBuf,

        /// Emit the full report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}
