//! Completion providers
//!
//! Defines the provider trait and the OpenAI-compatible implementation used
//! in production. The trait seam lets route tests substitute a scripted
//! double and assert on call counts.

use async_trait::async_trait;

use crate::config::ChatConfig;

use super::types::{ChatError, ChatMessage};

/// Completion provider trait
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send an assembled conversation and return the reply text.
    ///
    /// An empty reply is valid; callers must not treat it as an error.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;
}

/// OpenAI chat-completions provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: ChatConfig,
}

impl OpenAiProvider {
    /// Build from configuration resolved once at startup.
    ///
    /// A missing API key is allowed here so the viewer works without a
    /// credential; each completion attempt then fails with MissingApiKey.
    pub fn new(config: ChatConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let api_key = self.config.api_key.as_deref().ok_or(ChatError::MissingApiKey)?;

        let request = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
        });

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ChatError::Api(format!("Failed to reach completion API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Api(format!(
                "Completion API returned {}: {}",
                status, body
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ChatError::InvalidResponse(e.to_string()))?;

        // An empty or absent content field is a valid (if unhelpful) reply.
        let text = result["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(text)
    }
}
