//! API routes for the RAG server

pub mod chat;
pub mod query;

use axum::{
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/retrieve", post(query::retrieve))
        .route("/query", post(query::query_rag))
        .route("/chat", post(chat::chat_turn))
        .route("/chat/welcome", get(chat::welcome))
        .route("/info", get(info))
}

/// API info endpoint
async fn info() -> Json<Value> {
    Json(json!({
        "name": "medrag",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Question answering over medical articles with grounded, cited prompts",
        "endpoints": {
            "POST /api/retrieve": "Ranked passages for a query",
            "POST /api/query": "Answer a question with the passages it used",
            "POST /api/chat": "One chat turn over a client-held transcript",
            "GET /api/chat/welcome": "Initial chat transcript",
        }
    }))
}
