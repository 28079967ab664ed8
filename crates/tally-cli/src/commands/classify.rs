//! Backend check and batch categorization commands

use std::path::Path;

use anyhow::{bail, Context, Result};
use tally_core::{
    Categorizer, CategorySet, DegradeReason, ModelBackend, ModelClient, SemanticClassifier,
    Strategy, TrainingOutcome, Transaction,
};

/// Show the configured categories and probe the model backend
pub async fn cmd_check() -> Result<()> {
    let categories = CategorySet::standard();

    println!("📂 Categories: {}", categories.names().join(", "));
    println!("   Fallback: {}", categories.fallback());
    println!();

    let client = match ModelClient::from_env() {
        Some(client) => client,
        None => {
            println!("💡 No model backend configured; rule and statistical engines still work");
            println!();
            println!("To enable semantic classification:");
            println!("  1. Install Ollama: https://ollama.ai/download");
            println!("  2. Start the server: ollama serve");
            println!("  3. Set environment variable: export OLLAMA_HOST=http://localhost:11434");
            return Ok(());
        }
    };

    println!("🤖 Model backend: {} at {}", client.model(), client.host());

    print!("Checking backend availability... ");
    if client.health_check().await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!();
        println!("⚠️  Could not connect to the model backend at {}", client.host());
        return Ok(());
    }

    println!();
    println!("📋 Testing classification...");
    println!();

    let semantic = SemanticClassifier::new(client, categories.shared());
    let samples = ["UBER TRIP 84523", "NETFLIX.COM*1234", "STARBUCKS #1234"];
    for sample in samples {
        print!("  \"{}\" → ", sample);
        match semantic.classify(sample, None).await {
            Ok(category) => println!("{}", category),
            Err(e) => println!("❌ Error: {}", e),
        }
    }

    println!();
    println!("✅ Check complete!");
    Ok(())
}

/// Categorize a CSV of transactions, writing the result to a file or stdout
///
/// Progress output is suppressed in stdout mode so the emitted CSV stays
/// machine readable.
pub async fn cmd_classify(
    file: &Path,
    output: Option<&Path>,
    strategy: &str,
    concurrency: usize,
) -> Result<()> {
    let strategy: Strategy = strategy
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{} (expected rule, statistical, or semantic)", e))?;

    let chatty = output.is_some();

    let batch = super::load_batch(file)?;
    if chatty {
        super::print_warnings(&batch);
    }
    if batch.transactions.is_empty() {
        bail!("No usable transactions in {}", file.display());
    }
    if chatty {
        println!(
            "📥 Classifying {} transactions from {} ({} strategy)...",
            batch.transactions.len(),
            file.display(),
            strategy
        );
    }

    let categories = CategorySet::standard().shared();
    let categorizer = match ModelClient::from_env() {
        Some(client) => {
            if chatty && strategy == Strategy::Semantic {
                println!("🤖 Model backend: {} at {}", client.model(), client.host());
            }
            Categorizer::with_model_client(categories, client)
        }
        None => {
            if chatty && strategy == Strategy::Semantic {
                println!("💡 Tip: Set OLLAMA_HOST to enable semantic classification; using rules");
            }
            Categorizer::new(categories)
        }
    }
    .with_batch_concurrency(concurrency);

    if strategy == Strategy::Statistical {
        match categorizer.train(&batch.transactions)? {
            TrainingOutcome::Trained {
                accuracy,
                train_rows,
                holdout_rows,
            } => {
                if chatty {
                    println!(
                        "🧠 Trained on {} rows, {:.1}% accuracy over {} held-out rows",
                        train_rows,
                        accuracy * 100.0,
                        holdout_rows
                    );
                }
            }
            TrainingOutcome::Refused { rows, required } => {
                if chatty {
                    println!(
                        "⚠️  Only {} labeled rows (need {}); falling back to rules",
                        rows, required
                    );
                }
            }
        }
    }

    let classified = categorizer
        .classify_batch_tagged(&batch.transactions, strategy)
        .await;

    let mut degraded: Vec<(DegradeReason, usize)> = Vec::new();
    for classification in &classified.classifications {
        if let Some(reason) = classification.degraded {
            match degraded.iter_mut().find(|(r, _)| *r == reason) {
                Some((_, count)) => *count += 1,
                None => degraded.push((reason, 1)),
            }
        }
    }

    match output {
        Some(path) => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_transactions(&mut writer, &classified.transactions)?;
            println!(
                "✅ Wrote {} transactions to {}",
                classified.transactions.len(),
                path.display()
            );
        }
        None => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            write_transactions(&mut writer, &classified.transactions)?;
        }
    }

    if chatty && !degraded.is_empty() {
        let total: usize = degraded.iter().map(|(_, count)| count).sum();
        println!("⚠️  {} transactions fell back to rules:", total);
        for (reason, count) in &degraded {
            println!("   {}: {}", reason, count);
        }
    }

    Ok(())
}

/// Write transactions as CSV, keeping the account column only when present
fn write_transactions<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    transactions: &[Transaction],
) -> Result<()> {
    let has_account = transactions.iter().any(|tx| tx.account.is_some());
    if has_account {
        writer.write_record(["date", "description", "category", "amount", "account"])?;
    } else {
        writer.write_record(["date", "description", "category", "amount"])?;
    }
    for tx in transactions {
        let date = tx.date.to_string();
        let amount = format!("{:.2}", tx.amount);
        if has_account {
            writer.write_record([
                date.as_str(),
                tx.description.as_str(),
                tx.category.as_str(),
                amount.as_str(),
                tx.account.as_deref().unwrap_or(""),
            ])?;
        } else {
            writer.write_record([
                date.as_str(),
                tx.description.as_str(),
                tx.category.as_str(),
                amount.as_str(),
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}
