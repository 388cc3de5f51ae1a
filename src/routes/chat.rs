//! Chat relay route
//!
//! Validates the request, assembles the prompt, and forwards it to the
//! configured completion provider. The provider is only consulted after
//! validation passes, and upstream failures map to a generic 500 body.

use axum::{
    extract::State,
    routing::post,
    Json, Router,
};

use crate::chat::{build_messages, ChatError, ChatRequest, ChatResponse};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the chat router
pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

/// POST /chat
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    if request.message.trim().is_empty() {
        return Err(AppError::BadRequest("Message is required".to_string()));
    }

    let messages = build_messages(&request);

    tracing::debug!(
        history_len = request.history.len(),
        page = request.context.as_ref().and_then(|c| c.current_page),
        "Relaying chat message"
    );

    let response = state
        .completions()
        .complete(&messages)
        .await
        .map_err(|e| match e {
            ChatError::MissingApiKey => AppError::Configuration(e.to_string()),
            ChatError::Api(msg) => AppError::Upstream(msg),
            ChatError::InvalidResponse(msg) => AppError::Upstream(msg),
        })?;

    Ok(Json(ChatResponse { response }))
}
