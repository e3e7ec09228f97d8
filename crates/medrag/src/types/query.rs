//! Request types for the HTTP API

use serde::{Deserialize, Serialize};

use super::response::ChatMessage;

/// Question for the full answer pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question to answer
    pub question: String,
}

/// Retrieval-only request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveRequest {
    /// Free-text query
    pub query: String,
    /// Number of contexts (defaults to the configured top-k)
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// One chat turn plus the transcript shown so far
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// New user message
    pub message: String,
    /// Transcript rendered by the client
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}
