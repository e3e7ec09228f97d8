//! Retrieval and question answering endpoints

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{AnswerResponse, QueryRequest, RetrieveRequest, RetrieveResponse};

/// POST /api/retrieve - Ranked contexts without generation
pub async fn retrieve(
    State(state): State<AppState>,
    Json(request): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>> {
    let start = Instant::now();
    let k = request
        .top_k
        .unwrap_or(state.context().config().retrieval.top_k);

    tracing::info!("Retrieve: \"{}\" (k={})", request.query, k);

    let contexts = state.retriever().retrieve(&request.query, k).await?;

    Ok(Json(RetrieveResponse {
        contexts,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

/// POST /api/query - Answer a question from retrieved contexts
pub async fn query_rag(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<AnswerResponse>> {
    tracing::info!("Query: \"{}\"", request.question);

    let _permit = state.acquire().await?;
    let response = state.pipeline().answer_timed(&request.question).await?;

    Ok(Json(response))
}
