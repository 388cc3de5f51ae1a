//! Chat relay
//!
//! Forwards user questions about the currently viewed PDF to an external
//! chat-completion API. The server keeps no conversation state: the client
//! resubmits the full history with every request.

mod prompt;
mod provider;
mod types;

pub use prompt::{build_messages, HISTORY_LIMIT};
pub use provider::{CompletionProvider, OpenAiProvider};
pub use types::{ChatError, ChatMessage, ChatRequest, ChatResponse, ChatTurn, ViewingContext};
