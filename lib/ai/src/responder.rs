//! Response generation for LLM Engine nodes.

use crate::backend::{LlmBackend, LlmRequest};
use crate::prompt::build_prompt;
use async_trait::async_trait;
use stackflow_workflow::collaborator::{CollaboratorError, GenerationRequest, ResponseGenerator};
use tracing::{debug, instrument, warn};

/// Returned instead of calling the provider when no key is available.
pub const MISSING_KEY_RESPONSE: &str = "Error: API key is required for LLM generation.";

/// Answers queries with an [`LlmBackend`].
///
/// Problems with the request or the provider are reported as response text,
/// never as `Err`, so the engine can show them to the user.
pub struct LlmResponder<B: LlmBackend> {
    backend: B,
    max_tokens: Option<u32>,
}

impl<B: LlmBackend> LlmResponder<B> {
    /// Creates a responder over `backend`.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            max_tokens: None,
        }
    }

    /// Caps the length of generated responses.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

#[async_trait]
impl<B: LlmBackend> ResponseGenerator for LlmResponder<B> {
    #[instrument(skip_all, fields(provider = %self.backend.provider(), model = request.model))]
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, CollaboratorError> {
        let Some(api_key) = request.api_key.filter(|k| !k.trim().is_empty()) else {
            warn!("generation requested without an API key");
            return Ok(MISSING_KEY_RESPONSE.to_string());
        };

        let prompt = match build_prompt(request.query, request.context, request.custom_prompt) {
            Ok(prompt) => prompt,
            Err(e) => return Ok(format!("Error generating response: {e}")),
        };

        let mut llm_request =
            LlmRequest::new(prompt, request.model, api_key).with_temperature(request.temperature);
        if let Some(max_tokens) = self.max_tokens {
            llm_request = llm_request.with_max_tokens(max_tokens);
        }

        match self.backend.generate(&llm_request).await {
            Ok(response) => {
                debug!(
                    prompt_tokens = response.usage.prompt_tokens,
                    completion_tokens = response.usage.completion_tokens,
                    "response generated"
                );
                Ok(response.content)
            }
            Err(e) => {
                warn!(error = %e, "LLM backend call failed");
                Ok(format!("Error generating response: {e}"))
            }
        }
    }
}
