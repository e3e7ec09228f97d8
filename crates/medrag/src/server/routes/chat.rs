//! Chat endpoints over a client-held transcript

use axum::{extract::State, Json};

use crate::chat;
use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{ChatRequest, ChatResponse};

/// GET /api/chat/welcome - Transcript for a new conversation
pub async fn welcome() -> Json<ChatResponse> {
    Json(ChatResponse {
        history: chat::welcome_transcript(),
    })
}

/// POST /api/chat - Append one exchange to the transcript
///
/// Pipeline failures are reported inside the transcript, not as HTTP errors.
pub async fn chat_turn(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let _permit = state.acquire().await?;
    let history = chat::respond(state.pipeline(), &request.message, request.history).await;
    Ok(Json(ChatResponse { history }))
}
