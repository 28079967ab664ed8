//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Spending report over a transaction CSV
//! - `classify` - Backend check and batch categorization
//! - `train` - Statistical model training

pub mod analyze;
pub mod classify;
pub mod train;

// Re-export command functions for main.rs
pub use analyze::*;
pub use classify::*;
pub use train::*;

use std::path::Path;

use anyhow::{Context, Result};
use tally_core::{CategorySet, NormalizedBatch, Normalizer};

/// Read a transaction CSV from disk and normalize it
pub fn load_batch(file: &Path) -> Result<NormalizedBatch> {
    let reader = std::fs::File::open(file)
        .with_context(|| format!("Failed to open file: {}", file.display()))?;
    let normalizer = Normalizer::new(CategorySet::standard().shared())?;
    normalizer
        .normalize(reader)
        .with_context(|| format!("Failed to read transactions from {}", file.display()))
}

/// Echo data quality findings collected during normalization
pub fn print_warnings(batch: &NormalizedBatch) {
    for warning in &batch.warnings {
        println!("⚠️  {}", warning);
    }
    if batch.dropped_rows > 0 {
        println!(
            "⚠️  {} rows dropped (unparseable date or amount)",
            batch.dropped_rows
        );
    }
}
