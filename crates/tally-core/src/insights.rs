//! Spending analytics over classified transactions
//!
//! Pure read-only functions: summary statistics, outlier detection,
//! recurring payment grouping, per-category breakdowns, savings
//! suggestions, and a recent-spending overview. Empty input always
//! yields a defined empty/zero result, never an error.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// Outlier threshold in standard deviations above the mean
const ANOMALY_SIGMA: f64 = 2.0;
/// A (description, amount) group is recurring past this many occurrences
const RECURRING_MIN_OCCURRENCES: usize = 3;
/// Categories considered for savings suggestions
const SAVINGS_TOP_CATEGORIES: usize = 3;
/// Minimum category spend before suggesting a reduction
const SAVINGS_MIN_SPEND: f64 = 100.0;
/// Suggested reduction rate
const SAVINGS_RATE: f64 = 0.15;
/// Window for the recent-spending split
const RECENT_WINDOW_DAYS: i64 = 30;

/// Headline statistics for a transaction set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingSummary {
    pub total: f64,
    pub mean: f64,
    pub count: usize,
    /// Category with the highest summed spend; first seen wins ties
    pub top_category: Option<String>,
    /// Most frequent description; first seen wins ties
    pub top_description: Option<String>,
}

/// Outlier scan result. The threshold is computed over the same set
/// being scanned, outliers included; see `detect_anomalies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub mean: f64,
    pub std_dev: f64,
    pub threshold: f64,
    pub outliers: Vec<Transaction>,
}

/// A (description, amount) pair observed often enough to look like a
/// recurring payment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringGroup {
    pub description: String,
    pub amount: f64,
    pub occurrences: usize,
}

/// Per-category spending aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySpend {
    pub category: String,
    pub total: f64,
    pub count: usize,
    pub mean: f64,
}

/// A suggested spending reduction for a heavy category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsSuggestion {
    pub category: String,
    pub current_spending: f64,
    pub suggested_reduction: f64,
    pub percentage: f64,
}

/// Totals split around a recent window anchored at the newest row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingOverview {
    pub total: f64,
    /// Total divided by the number of distinct dates observed
    pub daily_average: f64,
    /// Spend within the last 30 days of the newest transaction
    pub recent_total: f64,
    /// Spend before that window
    pub previous_total: f64,
}

/// Compute headline statistics
pub fn summarize(transactions: &[Transaction]) -> SpendingSummary {
    if transactions.is_empty() {
        return SpendingSummary {
            total: 0.0,
            mean: 0.0,
            count: 0,
            top_category: None,
            top_description: None,
        };
    }

    let total: f64 = transactions.iter().map(|t| t.amount).sum();
    let count = transactions.len();

    let top_category = top_by(transactions, |t| t.category.as_str(), |t| t.amount);
    let top_description = top_by(transactions, |t| t.description.as_str(), |_| 1.0);

    SpendingSummary {
        total,
        mean: total / count as f64,
        count,
        top_category,
        top_description,
    }
}

/// Flag transactions with `amount > mean + 2 sigma` (sample standard
/// deviation). The statistics are computed over the same set being
/// scanned, outliers included, so a single extreme value raises the
/// threshold that judges it.
pub fn detect_anomalies(transactions: &[Transaction]) -> AnomalyReport {
    if transactions.len() < 2 {
        let mean = transactions.first().map(|t| t.amount).unwrap_or(0.0);
        return AnomalyReport {
            mean,
            std_dev: 0.0,
            threshold: mean,
            outliers: Vec::new(),
        };
    }

    let n = transactions.len() as f64;
    let mean: f64 = transactions.iter().map(|t| t.amount).sum::<f64>() / n;
    let variance =
        transactions.iter().map(|t| (t.amount - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std_dev = variance.sqrt();
    let threshold = mean + ANOMALY_SIGMA * std_dev;

    let outliers = transactions
        .iter()
        .filter(|t| t.amount > threshold)
        .cloned()
        .collect();

    AnomalyReport {
        mean,
        std_dev,
        threshold,
        outliers,
    }
}

/// Group by exact description and cent-rounded amount; keep groups seen
/// more than twice. Sorted by occurrences, then description, then amount.
pub fn recurring_groups(transactions: &[Transaction]) -> Vec<RecurringGroup> {
    let mut groups: HashMap<(String, i64), usize> = HashMap::new();
    for tx in transactions {
        let key = (tx.description.clone(), to_cents(tx.amount));
        *groups.entry(key).or_insert(0) += 1;
    }

    let mut recurring: Vec<RecurringGroup> = groups
        .into_iter()
        .filter(|(_, occurrences)| *occurrences >= RECURRING_MIN_OCCURRENCES)
        .map(|((description, cents), occurrences)| RecurringGroup {
            description,
            amount: cents as f64 / 100.0,
            occurrences,
        })
        .collect();

    recurring.sort_by(|a, b| {
        b.occurrences
            .cmp(&a.occurrences)
            .then_with(|| a.description.cmp(&b.description))
            .then_with(|| to_cents(a.amount).cmp(&to_cents(b.amount)))
    });
    recurring
}

/// Per-category totals, highest spend first
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategorySpend> {
    let mut totals: HashMap<&str, (f64, usize)> = HashMap::new();
    for tx in transactions {
        let entry = totals.entry(tx.category.as_str()).or_insert((0.0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    let mut breakdown: Vec<CategorySpend> = totals
        .into_iter()
        .map(|(category, (total, count))| CategorySpend {
            category: category.to_string(),
            total,
            count,
            mean: total / count as f64,
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    breakdown
}

/// Suggest a 15% reduction for the top three categories spending over
/// the minimum
pub fn savings_suggestions(transactions: &[Transaction]) -> Vec<SavingsSuggestion> {
    category_breakdown(transactions)
        .into_iter()
        .take(SAVINGS_TOP_CATEGORIES)
        .filter(|c| c.total > SAVINGS_MIN_SPEND)
        .map(|c| SavingsSuggestion {
            category: c.category,
            current_spending: c.total,
            suggested_reduction: c.total * SAVINGS_RATE,
            percentage: SAVINGS_RATE * 100.0,
        })
        .collect()
}

/// Split spending around the last 30 days of the newest row. `None`
/// on empty input.
pub fn spending_overview(transactions: &[Transaction]) -> Option<SpendingOverview> {
    let newest: NaiveDate = transactions.iter().map(|t| t.date).max()?;
    let cutoff = newest - Duration::days(RECENT_WINDOW_DAYS);

    let total: f64 = transactions.iter().map(|t| t.amount).sum();
    let recent_total: f64 = transactions
        .iter()
        .filter(|t| t.date > cutoff)
        .map(|t| t.amount)
        .sum();

    let distinct_dates: usize = transactions
        .iter()
        .map(|t| t.date)
        .collect::<std::collections::HashSet<_>>()
        .len();

    Some(SpendingOverview {
        total,
        daily_average: total / distinct_dates as f64,
        recent_total,
        previous_total: total - recent_total,
    })
}

/// First-occurrence-wins argmax of summed weights per key
fn top_by<'a>(
    transactions: &'a [Transaction],
    key: impl Fn(&'a Transaction) -> &'a str,
    weight: impl Fn(&Transaction) -> f64,
) -> Option<String> {
    let mut sums: HashMap<&str, f64> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for tx in transactions {
        let k = key(tx);
        if !sums.contains_key(k) {
            order.push(k);
        }
        *sums.entry(k).or_insert(0.0) += weight(tx);
    }

    let mut best: Option<(&str, f64)> = None;
    for k in order {
        let sum = sums[k];
        if best.map_or(true, |(_, s)| sum > s) {
            best = Some((k, sum));
        }
    }
    best.map(|(k, _)| k.to_string())
}

fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
