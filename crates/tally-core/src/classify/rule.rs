//! Deterministic keyword classification
//!
//! The terminal fallback for every other strategy: pure, total, and
//! infallible. Matches the lowercased description against the ordered
//! category pattern table; the first category with a matching substring
//! wins, so earlier categories break ties.

use std::sync::Arc;

use tracing::debug;

use crate::categories::CategorySet;

pub struct RuleClassifier {
    categories: Arc<CategorySet>,
}

impl RuleClassifier {
    pub fn new(categories: Arc<CategorySet>) -> Self {
        Self { categories }
    }

    /// Classify a description by first-match substring lookup
    pub fn classify(&self, description: &str) -> &str {
        let text = description.to_lowercase();

        for group in self.categories.groups() {
            if group.patterns().iter().any(|p| text.contains(p.as_str())) {
                debug!(category = group.name(), "Rule match");
                return group.name();
            }
        }

        self.categories.fallback()
    }
}
