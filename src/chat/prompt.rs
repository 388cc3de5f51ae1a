//! Prompt assembly
//!
//! Builds the message list sent to the completion API: a system prompt
//! rendering the viewing context, the most recent history turns in order,
//! then the current user message.

use super::types::{ChatMessage, ChatRequest, ViewingContext};

/// History turns beyond this are dropped (oldest first) to bound token use.
pub const HISTORY_LIMIT: usize = 10;

/// Assemble the full message list for one relay request.
pub fn build_messages(request: &ChatRequest) -> Vec<ChatMessage> {
    let context = request.context.clone().unwrap_or_default();

    let mut messages = Vec::with_capacity(request.history.len() + 2);
    messages.push(ChatMessage::system(system_prompt(&context)));

    let skip = request.history.len().saturating_sub(HISTORY_LIMIT);
    for turn in request.history.iter().skip(skip) {
        messages.push(ChatMessage {
            role: turn.role.clone(),
            content: turn.content.clone(),
        });
    }

    messages.push(ChatMessage::user(request.message.trim()));
    messages
}

fn system_prompt(context: &ViewingContext) -> String {
    let filename = context.filename.as_deref().unwrap_or("Unknown");
    let current_page = context
        .current_page
        .map(|p| p.to_string())
        .unwrap_or_else(|| "1".to_string());
    let total_pages = context
        .total_pages
        .map(|p| p.to_string())
        .unwrap_or_else(|| "Unknown".to_string());
    let selected = context
        .selected_text
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("None");

    format!(
        "You are a helpful PDF assistant. You're helping the user understand a PDF document.\n\
         \n\
         Current PDF Context:\n\
         - Filename: {filename}\n\
         - The user is viewing page {current_page} of {total_pages}\n\
         - Selected Text: {selected}\n\
         \n\
         You can help with explaining content and concepts, summarizing sections or pages, \
         answering questions about the document, and discussing selected text. \
         Be concise, helpful, and focus on the PDF content. If the user asks about specific \
         pages or sections, acknowledge the current page context."
    )
}
