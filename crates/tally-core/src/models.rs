//! Domain models for Tally

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A financial transaction
///
/// Amounts are always non-negative: the normalizer treats every imported
/// row as an expense and discards sign. `category` is always a member of
/// the configured category set (the catch-all included).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    pub category: String,
    /// Optional account label carried through from the source file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl Transaction {
    pub fn new(date: NaiveDate, description: &str, amount: f64, category: &str) -> Self {
        Self {
            date,
            description: description.to_string(),
            amount,
            category: category.to_string(),
            account: None,
        }
    }
}

/// Classification strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Keyword rules (default, the universal fallback)
    #[default]
    Rule,
    /// Trained TF-IDF + Naive Bayes model
    Statistical,
    /// Remote language model
    Semantic,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rule => "rule",
            Self::Statistical => "statistical",
            Self::Semantic => "semantic",
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rule" | "rules" | "keyword" => Ok(Self::Rule),
            "statistical" | "ml" | "model" => Ok(Self::Statistical),
            "semantic" | "llm" | "ai" => Ok(Self::Semantic),
            _ => Err(format!("Unknown strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
