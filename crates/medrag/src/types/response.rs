//! Response types for retrieval, answers and chat

use serde::{Deserialize, Serialize};

/// One ranked passage returned by the retriever
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// 1-based rank
    pub rank: usize,
    /// Similarity (higher is better)
    pub score: f32,
    pub title: String,
    pub url: String,
    pub category: String,
    pub content: String,
}

impl RetrievedContext {
    /// Source line as rendered in prompts: `title — url`, or just the title
    pub fn source_line(&self) -> String {
        if self.url.is_empty() {
            self.title.clone()
        } else {
            format!("{} — {}", self.title, self.url)
        }
    }
}

/// Answer text together with the contexts it was grounded on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answer: String,
    pub contexts: Vec<RetrievedContext>,
    pub processing_time_ms: u64,
}

/// Retrieval-only response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrieveResponse {
    pub contexts: Vec<RetrievedContext>,
    pub processing_time_ms: u64,
}

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single transcript entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Updated transcript after a chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub history: Vec<ChatMessage>,
}
