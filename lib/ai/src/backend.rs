//! LLM backend abstraction.
//!
//! Provides a unified interface for different LLM providers. The model and
//! the API key travel with each request, because every LLM Engine node picks
//! its own.

use crate::error::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A request to an LLM.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// The rendered prompt.
    pub prompt: String,
    /// Model identifier.
    pub model: String,
    /// Credentials for the provider.
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// Temperature for sampling.
    pub temperature: Option<f32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
}

// Redacts the key.
impl fmt::Debug for LlmRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmRequest")
            .field("prompt", &self.prompt)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl LlmRequest {
    /// Creates a request for `model` with just a prompt.
    #[must_use]
    pub fn new(
        prompt: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            api_key: api_key.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Sets the temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the max tokens.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A completed generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    #[serde(default)]
    pub usage: TokenUsage,
    /// Model the provider actually used, which may differ from the request.
    pub model: String,
}

/// Tokens billed for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl TokenUsage {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.prompt_tokens.saturating_add(self.completion_tokens)
    }
}

/// A chat-completion provider.
///
/// Implementations own transport and retries; the responder only sees the
/// final text or an [`LlmError`].
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Sends one prompt and waits for the completion.
    ///
    /// # Errors
    ///
    /// Returns an [`LlmError`] describing why the provider gave no answer.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Names the provider in logs, e.g. `openai` or `google`.
    fn provider(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_request_builder() {
        let request = LlmRequest::new("Hello, world!", "gpt-4o-mini", "sk-test")
            .with_temperature(0.7)
            .with_max_tokens(100);

        assert_eq!(request.prompt, "Hello, world!");
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(request.max_tokens, Some(100));
    }

    #[test]
    fn request_debug_hides_key() {
        let request = LlmRequest::new("hi", "gpt-4o-mini", "sk-secret");
        let debug = format!("{request:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn request_serialization_omits_key() {
        let request = LlmRequest::new("hi", "gpt-4o-mini", "sk-secret");
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("api_key").is_none());
        assert_eq!(json["model"], "gpt-4o-mini");
    }

    #[test]
    fn response_without_usage_deserializes() {
        let response: LlmResponse = serde_json::from_str(
            r#"{ "content": "Hello.", "model": "gpt-4o-mini-2024-07-18" }"#,
        )
        .expect("deserialize");
        assert_eq!(response.usage.total(), 0);
        assert_eq!(response.model, "gpt-4o-mini-2024-07-18");
    }
}
