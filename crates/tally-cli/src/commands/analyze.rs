//! Spending analysis over a transaction CSV

use std::path::Path;

use anyhow::{bail, Result};
use tally_core::insights;

/// Print a spending report: summary, category breakdown, outliers,
/// recurring payments, savings ideas, and a recent-window overview
pub fn cmd_analyze(file: &Path, json: bool) -> Result<()> {
    let batch = super::load_batch(file)?;
    if !json {
        super::print_warnings(&batch);
    }
    if batch.transactions.is_empty() {
        bail!("No usable transactions in {}", file.display());
    }

    let transactions = &batch.transactions;
    let summary = insights::summarize(transactions);
    let breakdown = insights::category_breakdown(transactions);
    let anomalies = insights::detect_anomalies(transactions);
    let recurring = insights::recurring_groups(transactions);
    let savings = insights::savings_suggestions(transactions);
    let overview = insights::spending_overview(transactions);

    if json {
        let report = serde_json::json!({
            "summary": summary,
            "by_category": breakdown,
            "anomalies": anomalies,
            "recurring": recurring,
            "savings": savings,
            "overview": overview,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "📊 {} transactions totalling ${:.2}",
        summary.count, summary.total
    );
    println!("   Average: ${:.2}", summary.mean);
    if let Some(top) = &summary.top_category {
        println!("   Top category: {}", top);
    }
    if let Some(description) = &summary.top_description {
        println!("   Most frequent: {}", description);
    }

    println!();
    println!("💰 Spending by category:");
    for entry in &breakdown {
        println!(
            "   {:<14} ${:>10.2}  ({} transactions, avg ${:.2})",
            entry.category, entry.total, entry.count, entry.mean
        );
    }

    println!();
    if anomalies.outliers.is_empty() {
        println!(
            "✅ No unusually large transactions (threshold ${:.2})",
            anomalies.threshold
        );
    } else {
        println!(
            "🚨 {} unusually large transaction(s), above ${:.2}:",
            anomalies.outliers.len(),
            anomalies.threshold
        );
        for tx in &anomalies.outliers {
            println!("   {}  {:<30} ${:.2}", tx.date, tx.description, tx.amount);
        }
    }

    println!();
    if recurring.is_empty() {
        println!("🔁 No recurring payments found");
    } else {
        println!("🔁 Recurring payments:");
        for group in &recurring {
            println!(
                "   {:<30} ${:>8.2} × {}",
                group.description, group.amount, group.occurrences
            );
        }
    }

    if !savings.is_empty() {
        println!();
        println!("💡 Savings opportunities:");
        for suggestion in &savings {
            println!(
                "   Trim {} spending by {:.0}% to save ${:.2}",
                suggestion.category, suggestion.percentage, suggestion.suggested_reduction
            );
        }
    }

    if let Some(overview) = overview {
        println!();
        println!(
            "🗓  Last 30 days: ${:.2} (previous: ${:.2}, daily average ${:.2})",
            overview.recent_total, overview.previous_total, overview.daily_average
        );
    }

    Ok(())
}
