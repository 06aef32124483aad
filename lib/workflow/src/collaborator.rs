//! Capabilities the engine calls but does not implement.
//!
//! Document ingestion, context retrieval, and response generation are handed
//! to the engine as trait objects when the executor is built. Their latency
//! is opaque to the engine: each call is awaited to completion before the run
//! moves on.
//!
//! By contract, retrieval and generation report ordinary failures (missing
//! API key, empty index, provider error) as human-readable strings in their
//! `Ok` value. An `Err` means the collaborator itself broke down.

use async_trait::async_trait;
use std::fmt;

/// Retrieval result meaning "the index had nothing relevant".
pub const NO_CONTEXT_FOUND: &str = "No relevant context found.";

/// Prefix that marks a generation result as an error description.
pub const ERROR_MARKER: &str = "Error:";

/// Returns true if a generated response is an error description.
#[must_use]
pub fn is_error_response(response: &str) -> bool {
    response.starts_with(ERROR_MARKER)
}

/// Errors raised by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Document ingestion broke down.
    Ingestion { message: String },
    /// Context retrieval broke down.
    Retrieval { message: String },
    /// Response generation broke down.
    Generation { message: String },
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingestion { message } => write!(f, "document ingestion failed: {message}"),
            Self::Retrieval { message } => write!(f, "context retrieval failed: {message}"),
            Self::Generation { message } => write!(f, "response generation failed: {message}"),
        }
    }
}

impl std::error::Error for CollaboratorError {}

/// A document to add to the retrieval index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestRequest<'a> {
    /// Where the uploaded file lives.
    pub path: &'a str,
    /// Key for the embedding provider, if the user supplied one.
    pub api_key: Option<&'a str>,
    /// Embedding model name.
    pub embedding_model: &'a str,
}

/// A similarity lookup against the retrieval index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalRequest<'a> {
    /// The user's query.
    pub query: &'a str,
    /// Key for the embedding provider, if known.
    pub api_key: Option<&'a str>,
    /// Embedding model name.
    pub embedding_model: &'a str,
    /// Maximum number of passages to return.
    pub k: usize,
}

/// Everything needed to generate one response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationRequest<'a> {
    /// The user's query.
    pub query: &'a str,
    /// Retrieved context, if any.
    pub context: Option<&'a str>,
    /// Prompt override configured on the node.
    pub custom_prompt: Option<&'a str>,
    /// Key for the LLM provider, if known.
    pub api_key: Option<&'a str>,
    /// Model name.
    pub model: &'a str,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Adds documents to the retrieval index.
#[async_trait]
pub trait DocumentIngestor: Send + Sync {
    /// Ingests one document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document could not be added. Callers treat
    /// this as a per-file failure, never as fatal.
    async fn ingest(&self, request: &IngestRequest<'_>) -> Result<(), CollaboratorError>;
}

/// Looks up context relevant to a query.
#[async_trait]
pub trait ContextRetriever: Send + Sync {
    /// Returns concatenated passages, [`NO_CONTEXT_FOUND`], or a readable
    /// error description.
    ///
    /// # Errors
    ///
    /// Returns an error only if the retriever itself broke down.
    async fn retrieve(&self, request: &RetrievalRequest<'_>) -> Result<String, CollaboratorError>;
}

/// Produces a response to a query.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    /// Returns generated text, or a description starting with [`ERROR_MARKER`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the generator itself broke down.
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, CollaboratorError>;
}
