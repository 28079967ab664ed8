//! Mock backend for testing
//!
//! Provides predictable completions without a running LLM server.
//! Useful for unit tests and development.

use async_trait::async_trait;

use crate::error::Result;

use super::ModelBackend;

/// Mock model backend for testing
///
/// Keyword-matches the prompt to a standard category name, or returns a
/// fixed reply when one is configured.
#[derive(Clone, Default)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    /// Fixed reply overriding the keyword heuristic
    pub fixed_reply: Option<String>,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            healthy: true,
            fixed_reply: None,
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            fixed_reply: None,
        }
    }

    /// Create a mock that always completes with the given text
    pub fn with_reply(reply: &str) -> Self {
        Self {
            healthy: true,
            fixed_reply: Some(reply.to_string()),
        }
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> Result<String> {
        if let Some(ref reply) = self.fixed_reply {
            return Ok(reply.clone());
        }

        // Simple mock: keyword-match the prompt to a category name
        let category = match prompt.to_uppercase().as_str() {
            p if p.contains("UBER") || p.contains("TAXI") || p.contains("METRO") => "Transport",
            p if p.contains("NETFLIX") || p.contains("SPOTIFY") || p.contains("CINEMA") => {
                "Entertainment"
            }
            p if p.contains("STARBUCKS") || p.contains("RESTAURANT") || p.contains("GROCERY") => {
                "Food"
            }
            p if p.contains("AMAZON") || p.contains("MALL") => "Shopping",
            p if p.contains("HOSPITAL") || p.contains("PHARMACY") => "Healthcare",
            p if p.contains("ELECTRIC") || p.contains("INTERNET") => "Utilities",
            p if p.contains("TUITION") || p.contains("COURSE") => "Education",
            _ => "Others",
        };

        Ok(category.to_string())
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_completion() {
        let backend = MockBackend::new();
        assert_eq!(
            backend.complete("Transaction: UBER TRIP 2024").await.unwrap(),
            "Transport"
        );
        assert_eq!(
            backend.complete("Transaction: Netflix monthly").await.unwrap(),
            "Entertainment"
        );
        assert_eq!(
            backend.complete("Transaction: mystery charge").await.unwrap(),
            "Others"
        );
    }

    #[tokio::test]
    async fn test_fixed_reply() {
        let backend = MockBackend::with_reply("  Food.  ");
        assert_eq!(backend.complete("anything").await.unwrap(), "  Food.  ");
    }

    #[tokio::test]
    async fn test_unhealthy() {
        assert!(!MockBackend::unhealthy().health_check().await);
        assert!(MockBackend::new().health_check().await);
    }
}
