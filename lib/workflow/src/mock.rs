//! In-memory collaborators for tests and local experiments.

use crate::collaborator::{
    CollaboratorError, ContextRetriever, DocumentIngestor, GenerationRequest, IngestRequest,
    NO_CONTEXT_FOUND, ResponseGenerator, RetrievalRequest,
};
use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An ingestor that records paths and can be told to reject some of them.
#[derive(Debug, Default)]
pub struct MockIngestor {
    rejected_paths: Vec<String>,
    ingested: Mutex<Vec<String>>,
}

impl MockIngestor {
    /// Creates an ingestor that accepts every document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes ingestion of `path` fail.
    #[must_use]
    pub fn rejecting(mut self, path: impl Into<String>) -> Self {
        self.rejected_paths.push(path.into());
        self
    }

    /// Returns the paths ingested successfully, in call order.
    #[must_use]
    pub fn ingested(&self) -> Vec<String> {
        lock(&self.ingested).clone()
    }
}

#[async_trait]
impl DocumentIngestor for MockIngestor {
    async fn ingest(&self, request: &IngestRequest<'_>) -> Result<(), CollaboratorError> {
        if self.rejected_paths.iter().any(|p| p == request.path) {
            return Err(CollaboratorError::Ingestion {
                message: format!("cannot read {}", request.path),
            });
        }
        lock(&self.ingested).push(request.path.to_string());
        Ok(())
    }
}

/// A retriever that returns a fixed result.
#[derive(Debug)]
pub struct MockRetriever {
    result: Result<String, CollaboratorError>,
    queries: Mutex<Vec<String>>,
}

impl MockRetriever {
    /// Creates a retriever that always returns `context`.
    #[must_use]
    pub fn returning(context: impl Into<String>) -> Self {
        Self {
            result: Ok(context.into()),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Creates a retriever that never finds anything.
    #[must_use]
    pub fn empty() -> Self {
        Self::returning(NO_CONTEXT_FOUND)
    }

    /// Creates a retriever that raises `error` on every call.
    #[must_use]
    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            result: Err(error),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Returns the queries received, in call order.
    #[must_use]
    pub fn queries(&self) -> Vec<String> {
        lock(&self.queries).clone()
    }
}

#[async_trait]
impl ContextRetriever for MockRetriever {
    async fn retrieve(&self, request: &RetrievalRequest<'_>) -> Result<String, CollaboratorError> {
        lock(&self.queries).push(request.query.to_string());
        self.result.clone()
    }
}

/// A generation call as seen by [`MockGenerator`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedGeneration {
    pub query: String,
    pub context: Option<String>,
    pub custom_prompt: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
}

/// A generator that answers with a fixed response.
#[derive(Debug)]
pub struct MockGenerator {
    result: Result<String, CollaboratorError>,
    require_key: bool,
    calls: Mutex<Vec<RecordedGeneration>>,
}

impl MockGenerator {
    /// Creates a generator that always answers `response`, with or without a key.
    #[must_use]
    pub fn responding(response: impl Into<String>) -> Self {
        Self {
            result: Ok(response.into()),
            require_key: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Creates a generator that raises `error` on every call.
    #[must_use]
    pub fn failing(error: CollaboratorError) -> Self {
        Self {
            result: Err(error),
            require_key: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers with an error response when no API key is supplied, the way
    /// a real provider client does.
    #[must_use]
    pub fn requiring_key(mut self) -> Self {
        self.require_key = true;
        self
    }

    /// Returns the calls received, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedGeneration> {
        lock(&self.calls).clone()
    }
}

#[async_trait]
impl ResponseGenerator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest<'_>) -> Result<String, CollaboratorError> {
        lock(&self.calls).push(RecordedGeneration {
            query: request.query.to_string(),
            context: request.context.map(str::to_string),
            custom_prompt: request.custom_prompt.map(str::to_string),
            api_key: request.api_key.map(str::to_string),
            model: request.model.to_string(),
            temperature: request.temperature,
        });

        if self.require_key && request.api_key.is_none() {
            return Ok("Error: API key is required for LLM generation.".to_string());
        }
        self.result.clone()
    }
}
