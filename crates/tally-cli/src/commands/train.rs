//! Statistical model training command

use std::path::Path;

use anyhow::{bail, Result};
use tally_core::{Categorizer, CategorySet, TrainingOutcome};

/// Train the statistical classifier on a labeled CSV and report accuracy
pub fn cmd_train(file: &Path) -> Result<()> {
    let batch = super::load_batch(file)?;
    super::print_warnings(&batch);

    if batch.transactions.is_empty() {
        bail!("No usable transactions in {}", file.display());
    }

    println!(
        "🧠 Training on {} transactions from {}...",
        batch.transactions.len(),
        file.display()
    );

    let categorizer = Categorizer::new(CategorySet::standard().shared());
    match categorizer.train(&batch.transactions)? {
        TrainingOutcome::Trained {
            accuracy,
            train_rows,
            holdout_rows,
        } => {
            println!("✅ Training complete!");
            println!("   Training rows: {}", train_rows);
            println!("   Held-out rows: {}", holdout_rows);
            println!("   Accuracy: {:.1}%", accuracy * 100.0);
        }
        TrainingOutcome::Refused { rows, required } => {
            println!(
                "⚠️  Not enough labeled rows: {} available, {} required",
                rows, required
            );
            println!("💡 Tip: Add more categorized transactions and try again");
        }
    }

    Ok(())
}
