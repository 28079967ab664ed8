//! Classification strategies and the orchestrator that arbitrates them
//!
//! Three interchangeable engines produce a category for a transaction
//! description:
//!
//! - `RuleClassifier`: keyword matching, always available, never fails
//! - `StatisticalClassifier`: trained TF-IDF + Naive Bayes model
//! - `SemanticClassifier`: local language model completion
//!
//! `Categorizer` owns all three and guarantees that every classification
//! lands on a name from its `CategorySet`. When the requested strategy
//! cannot answer (untrained model, missing backend, failed request,
//! out-of-set reply) the orchestrator falls back to the rule engine and
//! tags the result with the reason instead of surfacing an error.

pub mod rule;
pub mod semantic;
pub mod statistical;

pub use rule::RuleClassifier;
pub use semantic::SemanticClassifier;
pub use statistical::{StatisticalClassifier, TrainingOutcome};

use std::fmt;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tracing::warn;

use crate::ai::ModelClient;
use crate::categories::CategorySet;
use crate::error::{Error, Result};
use crate::models::{Strategy, Transaction};

/// Concurrent in-flight requests for batch classification
const DEFAULT_BATCH_CONCURRENCY: usize = 4;

/// Why a classification fell back to the rule engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// Semantic strategy requested without a configured model backend
    NotConfigured,
    /// Statistical strategy requested before a successful training call
    Untrained,
    /// The statistical model produced no usable prediction
    PredictionFailed,
    /// The model replied with something outside the category set
    InvalidResponse,
    /// The completion request failed (network, timeout, server error)
    RequestFailed,
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DegradeReason::NotConfigured => "no model backend configured",
            DegradeReason::Untrained => "model not trained",
            DegradeReason::PredictionFailed => "prediction failed",
            DegradeReason::InvalidResponse => "unrecognized model response",
            DegradeReason::RequestFailed => "model request failed",
        };
        f.write_str(text)
    }
}

/// One classification with provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Always a name from the orchestrator's category set
    pub category: String,
    /// The engine that produced the category
    pub resolved_by: Strategy,
    /// Present when the requested strategy could not answer
    pub degraded: Option<DegradeReason>,
}

/// Output of a batch classification call
#[derive(Debug)]
pub struct ClassifiedBatch {
    /// Copies of the input rows in input order, `category` overwritten
    pub transactions: Vec<Transaction>,
    /// How each row was resolved, index-aligned with `transactions`
    pub classifications: Vec<Classification>,
}

/// Strategy orchestrator
///
/// Owns one instance of each engine. The statistical model slot is
/// internally synchronized, so a shared `Categorizer` can train and
/// classify concurrently.
pub struct Categorizer {
    categories: Arc<CategorySet>,
    rule: RuleClassifier,
    statistical: StatisticalClassifier,
    semantic: Option<SemanticClassifier>,
    batch_concurrency: usize,
}

impl Categorizer {
    /// Create an orchestrator without a model backend. The semantic
    /// strategy degrades to rules until one is attached.
    pub fn new(categories: Arc<CategorySet>) -> Self {
        Self {
            rule: RuleClassifier::new(categories.clone()),
            statistical: StatisticalClassifier::new(),
            semantic: None,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            categories,
        }
    }

    /// Create an orchestrator with a model backend for the semantic
    /// strategy
    pub fn with_model_client(categories: Arc<CategorySet>, client: ModelClient) -> Self {
        let mut categorizer = Self::new(categories.clone());
        categorizer.semantic = Some(SemanticClassifier::new(client, categories));
        categorizer
    }

    /// Override the batch concurrency limit (minimum 1)
    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    /// Train the statistical model on labeled transactions
    pub fn train(&self, rows: &[Transaction]) -> Result<TrainingOutcome> {
        self.statistical.train(rows)
    }

    pub fn is_trained(&self) -> bool {
        self.statistical.is_trained()
    }

    /// Classify one description with the requested strategy
    pub async fn classify(
        &self,
        description: &str,
        amount: Option<f64>,
        strategy: Strategy,
    ) -> Classification {
        match strategy {
            Strategy::Rule => self.rule_result(description),
            Strategy::Statistical => match self.statistical.classify(description) {
                Some(predicted) => match self.categories.resolve(&predicted) {
                    Some(category) => Classification {
                        category: category.to_string(),
                        resolved_by: Strategy::Statistical,
                        degraded: None,
                    },
                    None => self.degrade(description, DegradeReason::PredictionFailed),
                },
                None => {
                    let reason = if self.statistical.is_trained() {
                        DegradeReason::PredictionFailed
                    } else {
                        DegradeReason::Untrained
                    };
                    self.degrade(description, reason)
                }
            },
            Strategy::Semantic => match &self.semantic {
                Some(semantic) => match semantic.classify(description, amount).await {
                    Ok(category) => Classification {
                        category,
                        resolved_by: Strategy::Semantic,
                        degraded: None,
                    },
                    Err(Error::UnknownCategory(raw)) => {
                        warn!(response = %raw, "Model answered outside the category set");
                        self.degrade(description, DegradeReason::InvalidResponse)
                    }
                    Err(e) => {
                        warn!(error = %e, "Model request failed");
                        self.degrade(description, DegradeReason::RequestFailed)
                    }
                },
                None => self.degrade(description, DegradeReason::NotConfigured),
            },
        }
    }

    /// Classify a batch with bounded concurrency, returning copies of
    /// the input rows with `category` overwritten. Output order matches
    /// input order.
    pub async fn classify_batch(
        &self,
        transactions: &[Transaction],
        strategy: Strategy,
    ) -> Vec<Transaction> {
        self.classify_batch_tagged(transactions, strategy)
            .await
            .transactions
    }

    /// Classify a batch, keeping the per-row resolution alongside the
    /// rewritten rows
    pub async fn classify_batch_tagged(
        &self,
        transactions: &[Transaction],
        strategy: Strategy,
    ) -> ClassifiedBatch {
        let classifications: Vec<Classification> = stream::iter(
            transactions
                .iter()
                .map(|tx| self.classify(&tx.description, Some(tx.amount), strategy)),
        )
        .buffered(self.batch_concurrency)
        .collect()
        .await;

        let transactions = transactions
            .iter()
            .zip(&classifications)
            .map(|(tx, classification)| {
                let mut tx = tx.clone();
                tx.category = classification.category.clone();
                tx
            })
            .collect();

        ClassifiedBatch {
            transactions,
            classifications,
        }
    }

    fn rule_result(&self, description: &str) -> Classification {
        Classification {
            category: self.rule.classify(description).to_string(),
            resolved_by: Strategy::Rule,
            degraded: None,
        }
    }

    fn degrade(&self, description: &str, reason: DegradeReason) -> Classification {
        warn!(reason = %reason, "Falling back to rule classification");
        let mut classification = self.rule_result(description);
        classification.degraded = Some(reason);
        classification
    }
}
