//! Document ingestion and context retrieval for KnowledgeBase nodes.

use crate::error::KnowledgeError;
use crate::index::{VectorIndex, VectorIndexFactory};
use crate::loader::DocumentLoader;
use crate::splitter::TextSplitter;
use async_trait::async_trait;
use stackflow_core::Result;
use stackflow_workflow::collaborator::{
    CollaboratorError, ContextRetriever, DocumentIngestor, IngestRequest, NO_CONTEXT_FOUND,
    RetrievalRequest,
};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Returned instead of searching when no key is available.
pub const MISSING_KEY_RESPONSE: &str = "Error: API key is required for context retrieval.";

/// Loads, splits and indexes documents, and retrieves passages for queries.
pub struct KnowledgeBase<F: VectorIndexFactory, L: DocumentLoader> {
    factory: F,
    loader: L,
    splitter: TextSplitter,
}

impl<F: VectorIndexFactory, L: DocumentLoader> KnowledgeBase<F, L> {
    /// Creates a knowledge base with the default splitter.
    pub fn new(factory: F, loader: L) -> Self {
        Self {
            factory,
            loader,
            splitter: TextSplitter::default(),
        }
    }

    /// Replaces the splitter.
    #[must_use]
    pub fn with_splitter(mut self, splitter: TextSplitter) -> Self {
        self.splitter = splitter;
        self
    }

    /// Loads `path`, splits it and adds the chunks to the model's index.
    ///
    /// Returns the number of chunks added.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is missing, the file cannot be loaded, or
    /// the index rejects the chunks.
    pub async fn add_document(
        &self,
        path: &Path,
        api_key: &str,
        embedding_model: &str,
    ) -> Result<usize, KnowledgeError> {
        if api_key.trim().is_empty() {
            return Err(KnowledgeError::MissingApiKey.into());
        }

        let documents = self.loader.load(path).await?;
        let chunks = self.splitter.split_documents(&documents);
        let index = self.factory.open(api_key, embedding_model).await?;
        index.add_chunks(&chunks).await?;

        Ok(chunks.len())
    }

    /// Returns the passages most similar to `query`, joined by newlines.
    ///
    /// Returns `None` when nothing relevant is indexed.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be opened or searched.
    pub async fn search(
        &self,
        query: &str,
        api_key: &str,
        embedding_model: &str,
        k: usize,
    ) -> Result<Option<String>, KnowledgeError> {
        let index = self.factory.open(api_key, embedding_model).await?;
        let chunks = index.similarity_search(query, k).await?;

        if chunks.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            chunks
                .iter()
                .map(|c| c.content.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
        ))
    }
}

#[async_trait]
impl<F: VectorIndexFactory, L: DocumentLoader> DocumentIngestor for KnowledgeBase<F, L> {
    #[instrument(skip_all, fields(path = request.path, model = request.embedding_model))]
    async fn ingest(&self, request: &IngestRequest<'_>) -> std::result::Result<(), CollaboratorError> {
        let api_key = request.api_key.unwrap_or("");

        match self
            .add_document(Path::new(request.path), api_key, request.embedding_model)
            .await
        {
            Ok(chunks) => {
                info!(chunks, "document added to vector index");
                Ok(())
            }
            Err(report) => {
                warn!(error = %report.current_context(), "document ingestion failed");
                Err(CollaboratorError::Ingestion {
                    message: report.current_context().to_string(),
                })
            }
        }
    }
}

#[async_trait]
impl<F: VectorIndexFactory, L: DocumentLoader> ContextRetriever for KnowledgeBase<F, L> {
    #[instrument(skip_all, fields(model = request.embedding_model, k = request.k))]
    async fn retrieve(
        &self,
        request: &RetrievalRequest<'_>,
    ) -> std::result::Result<String, CollaboratorError> {
        let Some(api_key) = request.api_key.filter(|k| !k.trim().is_empty()) else {
            return Ok(MISSING_KEY_RESPONSE.to_string());
        };

        let found = self
            .search(request.query, api_key, request.embedding_model, request.k)
            .await;

        Ok(match found {
            Ok(Some(context)) => context,
            Ok(None) => NO_CONTEXT_FOUND.to_string(),
            Err(report) => {
                warn!(error = %report.current_context(), "context retrieval failed");
                format!("Error retrieving context: {}", report.current_context())
            }
        })
    }
}
