//! Test utilities for tally-core
//!
//! This module provides testing infrastructure including a mock model
//! server speaking both supported wire protocols (Ollama generate and
//! OpenAI chat completions), usable for development and integration
//! tests without a running LLM.

use axum::{
    extract::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::sync::oneshot;

/// Mock model server for testing and development
///
/// Answers classification prompts with a category name derived from
/// keywords in the transaction description.
pub struct MockModelServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockModelServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/api/tags", get(handle_tags))
            .route("/api/generate", post(handle_generate))
            .route("/v1/models", get(handle_models))
            .route("/v1/chat/completions", post(handle_chat_completions));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockModelServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Ollama tags endpoint response (health check)
async fn handle_tags() -> Json<TagsResponse> {
    Json(TagsResponse {
        models: vec![ModelInfo {
            name: "llama3.2:latest".to_string(),
            modified_at: "2024-01-01T00:00:00Z".to_string(),
            size: 4_000_000_000,
        }],
    })
}

/// Ollama generate endpoint
async fn handle_generate(Json(request): Json<GenerateRequest>) -> Json<GenerateResponse> {
    let description = extract_description(&request.prompt);

    Json(GenerateResponse {
        model: request.model,
        response: categorize_mock(&description),
        done: true,
    })
}

/// OpenAI models endpoint (health check)
async fn handle_models() -> Json<ModelsResponse> {
    Json(ModelsResponse {
        object: "list".to_string(),
        data: vec![ModelEntry {
            id: "gpt-3.5-turbo".to_string(),
            object: "model".to_string(),
        }],
    })
}

/// OpenAI chat completions endpoint
async fn handle_chat_completions(
    Json(request): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let prompt = request
        .messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.as_str())
        .unwrap_or_default();
    let description = extract_description(prompt);

    Json(ChatResponse {
        choices: vec![ChatChoiceOut {
            message: ChatMessageOut {
                role: "assistant".to_string(),
                content: categorize_mock(&description),
            },
        }],
    })
}

/// Pull the description line out of a classification prompt
fn extract_description(prompt: &str) -> String {
    if let Some(start) = prompt.find("Transaction: ") {
        let after_start = &prompt[start + 13..];
        let end = after_start.find('\n').unwrap_or(after_start.len());
        return after_start[..end].trim().to_string();
    }
    prompt.to_string()
}

/// Mock classification logic: keyword patterns mapped to the standard
/// category names
fn categorize_mock(description: &str) -> String {
    let d = description.to_uppercase();

    let category = if d.contains("UBER")
        || d.contains("TAXI")
        || d.contains("PARKING")
        || d.contains("METRO")
        || d.contains("TRAIN")
    {
        "Transport"
    } else if d.contains("NETFLIX")
        || d.contains("SPOTIFY")
        || d.contains("MOVIE")
        || d.contains("CINEMA")
        || d.contains("CONCERT")
    {
        "Entertainment"
    } else if d.contains("RESTAURANT")
        || d.contains("CAFE")
        || d.contains("STARBUCKS")
        || d.contains("MCDONALD")
        || d.contains("PIZZA")
        || d.contains("GROCERY")
    {
        "Food"
    } else if d.contains("AMAZON") || d.contains("MALL") || d.contains("STORE") {
        "Shopping"
    } else if d.contains("ELECTRIC")
        || d.contains("WATER")
        || d.contains("INTERNET")
        || d.contains("RENT")
    {
        "Utilities"
    } else if d.contains("HOSPITAL")
        || d.contains("DOCTOR")
        || d.contains("PHARMACY")
        || d.contains("DENTAL")
    {
        "Healthcare"
    } else if d.contains("SCHOOL")
        || d.contains("COLLEGE")
        || d.contains("COURSE")
        || d.contains("TUITION")
    {
        "Education"
    } else {
        "Others"
    };

    category.to_string()
}

// Request/Response types for the mock server

#[derive(Debug, Serialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Serialize)]
struct ModelInfo {
    name: String,
    modified_at: String,
    size: u64,
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    model: String,
    response: String,
    done: bool,
}

#[derive(Debug, Serialize)]
struct ModelsResponse {
    object: String,
    data: Vec<ModelEntry>,
}

#[derive(Debug, Serialize)]
struct ModelEntry {
    id: String,
    object: String,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[allow(dead_code)]
    model: String,
    messages: Vec<ChatMessageIn>,
}

#[derive(Debug, Deserialize)]
struct ChatMessageIn {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    choices: Vec<ChatChoiceOut>,
}

#[derive(Debug, Serialize)]
struct ChatChoiceOut {
    message: ChatMessageOut,
}

#[derive(Debug, Serialize)]
struct ChatMessageOut {
    role: String,
    content: String,
}
