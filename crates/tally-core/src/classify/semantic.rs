//! Model-backed semantic classification
//!
//! Sends one transaction per completion request and validates the reply
//! against the category set. Anything the model returns outside the set
//! is an error for the orchestrator to resolve; this module never
//! substitutes a category of its own.

use std::sync::Arc;

use tracing::debug;

use crate::ai::{ModelBackend, ModelClient};
use crate::categories::CategorySet;
use crate::error::{Error, Result};

/// Semantic classifier backed by a local language model
#[derive(Clone)]
pub struct SemanticClassifier {
    client: ModelClient,
    categories: Arc<CategorySet>,
}

impl SemanticClassifier {
    pub fn new(client: ModelClient, categories: Arc<CategorySet>) -> Self {
        Self { client, categories }
    }

    /// Classify one description, returning the canonical category name.
    ///
    /// Fails when the request fails or when the model answers with
    /// anything outside the category set.
    pub async fn classify(&self, description: &str, amount: Option<f64>) -> Result<String> {
        let prompt = self.build_prompt(description, amount);
        let response = self.client.complete(&prompt).await?;

        let cleaned = clean_response(&response);
        match self.categories.resolve(cleaned) {
            Some(category) => {
                debug!(category, "Model classification");
                Ok(category.to_string())
            }
            None => Err(Error::UnknownCategory(truncate(&response, 80))),
        }
    }

    fn build_prompt(&self, description: &str, amount: Option<f64>) -> String {
        let mut prompt = format!(
            "Categorize this expense transaction into one of these categories: {}.\n\nTransaction: {}\n",
            self.categories.prompt_list(),
            description
        );
        if let Some(amount) = amount {
            prompt.push_str(&format!("Amount: ${:.2}\n", amount));
        }
        prompt.push_str("\nReturn only the category name, nothing else.");
        prompt
    }
}

/// Strip the wrapping a chat model tends to add around a bare answer:
/// whitespace, surrounding quotes, one trailing period
fn clean_response(response: &str) -> &str {
    let mut cleaned = response.trim();
    cleaned = cleaned.strip_prefix('"').unwrap_or(cleaned);
    cleaned = cleaned.strip_suffix('"').unwrap_or(cleaned);
    cleaned = cleaned.strip_suffix('.').unwrap_or(cleaned);
    cleaned.trim()
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
