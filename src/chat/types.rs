//! Chat relay types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body of POST /chat.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's current message. Required, must not be blank; an absent
    /// field is treated like an empty one so both reject with 400.
    #[serde(default)]
    pub message: String,
    /// Prior conversation turns, oldest first.
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    /// What the user is looking at in the viewer.
    #[serde(default)]
    pub context: Option<ViewingContext>,
}

/// One prior conversation turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Viewer-side context sent along with a chat message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewingContext {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub selected_text: Option<String>,
}

/// Body of a successful /chat response.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// A message in the completion API conversation format.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Completion provider errors
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Completion API key is not configured")]
    MissingApiKey,

    #[error("Completion API request failed: {0}")]
    Api(String),

    #[error("Completion API returned a malformed response: {0}")]
    InvalidResponse(String),
}
