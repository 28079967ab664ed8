//! Tally Core Library
//!
//! Shared functionality for the Tally expense classification tool:
//! - CSV normalization into validated transactions
//! - Rule, statistical, and model-backed classification strategies
//! - Strategy orchestration with explicit rule fallback
//! - Pluggable local model backends (Ollama, OpenAI-compatible servers)
//! - Spending analytics: summaries, outliers, recurring payments

pub mod ai;
pub mod categories;
pub mod classify;
pub mod error;
pub mod insights;
pub mod models;
pub mod normalize;

/// Test utilities including the mock model server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{MockBackend, ModelBackend, ModelClient, OllamaBackend, OpenAICompatibleBackend};
pub use categories::{CategoryGroup, CategorySet};
pub use classify::{
    Categorizer, ClassifiedBatch, Classification, DegradeReason, RuleClassifier,
    SemanticClassifier, StatisticalClassifier, TrainingOutcome,
};
pub use error::{Error, Result};
pub use insights::{
    AnomalyReport, CategorySpend, RecurringGroup, SavingsSuggestion, SpendingOverview,
    SpendingSummary,
};
pub use models::{Strategy, Transaction};
pub use normalize::{NormalizedBatch, Normalizer, NormalizerConfig};
