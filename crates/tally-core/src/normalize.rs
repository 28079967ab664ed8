//! Tabular ingestion into the canonical transaction schema
//!
//! Accepts CSV with heterogeneous column naming, resolves known aliases to
//! the canonical fields, coerces amount/date values, and collects non-fatal
//! validation warnings. Rows that fail coercion are dropped and counted
//! rather than aborting the batch; the only fatal condition is a header row
//! that cannot satisfy the required schema.

use std::io::Read;
use std::sync::Arc;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use regex::Regex;
use tracing::debug;

use crate::categories::CategorySet;
use crate::error::{Error, Result};
use crate::models::Transaction;

/// Required canonical columns, in reporting order
const REQUIRED_COLUMNS: [&str; 4] = ["date", "description", "category", "amount"];

/// Normalizer tuning
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    /// Amounts above this raise the "very large amounts" warning
    pub large_amount_threshold: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            large_amount_threshold: 10_000.0,
        }
    }
}

/// Output of a normalization call
#[derive(Debug)]
pub struct NormalizedBatch {
    pub transactions: Vec<Transaction>,
    /// Rows discarded because their date or amount would not coerce
    pub dropped_rows: usize,
    /// Non-fatal validation findings, human readable
    pub warnings: Vec<String>,
}

/// Maps arbitrary tabular input into canonical transactions
pub struct Normalizer {
    categories: Arc<CategorySet>,
    symbol_strip: Regex,
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(categories: Arc<CategorySet>) -> Result<Self> {
        Self::with_config(categories, NormalizerConfig::default())
    }

    pub fn with_config(categories: Arc<CategorySet>, config: NormalizerConfig) -> Result<Self> {
        Ok(Self {
            categories,
            symbol_strip: Regex::new(r"[^0-9.\-]")?,
            config,
        })
    }

    /// Normalize CSV input into canonical transactions
    ///
    /// Fails only when the header cannot be resolved to the required
    /// schema (or the reader itself fails); everything row-level is
    /// dropped-and-counted or reported as a warning.
    pub fn normalize<R: Read>(&self, reader: R) -> Result<NormalizedBatch> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let columns = resolve_columns(&headers)?;

        let mut transactions = Vec::new();
        let mut dropped_rows = 0;
        let mut saw_negative = false;
        let mut saw_large = false;
        let mut saw_missing = false;

        for result in rdr.records() {
            let record = result?;

            let date_raw = cell(&record, columns.date);
            let description_raw = cell(&record, columns.description);
            let category_raw = cell(&record, columns.category);
            let amount_raw = cell(&record, columns.amount);

            if date_raw.is_empty()
                || description_raw.is_empty()
                || category_raw.is_empty()
                || amount_raw.is_empty()
            {
                saw_missing = true;
            }

            let Some(amount) = self.clean_amount(amount_raw) else {
                debug!(raw = %amount_raw, "Dropping row with uncoercible amount");
                dropped_rows += 1;
                continue;
            };
            let Some(date) = parse_date(date_raw) else {
                debug!(raw = %date_raw, "Dropping row with uncoercible date");
                dropped_rows += 1;
                continue;
            };

            if amount < 0.0 {
                saw_negative = true;
            }
            let amount = amount.abs();
            if amount > self.config.large_amount_threshold {
                saw_large = true;
            }

            let account = columns
                .account
                .map(|idx| cell(&record, idx))
                .filter(|a| !a.is_empty())
                .map(|a| a.to_string());

            transactions.push(Transaction {
                date,
                description: description_raw.to_string(),
                amount,
                category: self.categories.resolve_or_fallback(category_raw).to_string(),
                account,
            });
        }

        let mut warnings = Vec::new();
        if transactions.is_empty() {
            warnings.push("No data rows found".to_string());
        }
        if saw_negative {
            warnings.push("Negative amounts found".to_string());
        }
        if saw_large {
            warnings.push("Very large amounts detected - please verify".to_string());
        }
        if saw_missing {
            warnings.push("Missing values detected".to_string());
        }

        debug!(
            rows = transactions.len(),
            dropped = dropped_rows,
            warnings = warnings.len(),
            "Normalized batch"
        );

        Ok(NormalizedBatch {
            transactions,
            dropped_rows,
            warnings,
        })
    }

    /// Strip currency symbols and coerce to a number. None means the row
    /// should be dropped.
    fn clean_amount(&self, raw: &str) -> Option<f64> {
        let cleaned = self.symbol_strip.replace_all(raw.trim(), "");
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }
}

/// Resolved indices of the canonical columns in the source header
struct ColumnMap {
    date: usize,
    description: usize,
    category: usize,
    amount: usize,
    account: Option<usize>,
}

/// Resolve header aliases case/whitespace-insensitively
fn resolve_columns(headers: &csv::StringRecord) -> Result<ColumnMap> {
    let mut date = None;
    let mut description = None;
    let mut category = None;
    let mut amount = None;
    let mut account = None;

    for (idx, header) in headers.iter().enumerate() {
        let canonical = canonical_header(header);
        let slot = match canonical.as_str() {
            "date" => &mut date,
            "description" | "transaction description" => &mut description,
            "category" => &mut category,
            "amount" => &mut amount,
            "account" | "account name" => &mut account,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(idx);
        }
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .zip([&date, &description, &category, &amount])
        .filter(|(_, slot)| slot.is_none())
        .map(|(name, _)| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(Error::Schema { missing });
    }

    Ok(ColumnMap {
        date: date.unwrap_or_default(),
        description: description.unwrap_or_default(),
        category: category.unwrap_or_default(),
        amount: amount.unwrap_or_default(),
        account,
    })
}

fn canonical_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn cell<'a>(record: &'a csv::StringRecord, idx: usize) -> &'a str {
    record.get(idx).unwrap_or_default().trim()
}

/// Parse a date string against the supported formats
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let formats = [
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%Y-%m-%d", // 2024-01-15
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    None
}
