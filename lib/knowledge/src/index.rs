//! Vector index abstraction.
//!
//! Embedding and storage are provider concerns. A [`VectorIndexFactory`]
//! opens the index for a given key and embedding model; the index then
//! stores chunks and answers similarity searches.

use crate::document::Chunk;
use crate::error::KnowledgeError;
use async_trait::async_trait;
use stackflow_core::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A searchable collection of chunks.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Adds chunks to the index.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::IndexFailed`] if the chunks could not be stored.
    async fn add_chunks(&self, chunks: &[Chunk]) -> Result<(), KnowledgeError>;

    /// Returns up to `k` chunks most similar to `query`, best first.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::IndexFailed`] if the search failed.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Chunk>, KnowledgeError>;
}

/// Opens vector indexes.
#[async_trait]
pub trait VectorIndexFactory: Send + Sync {
    type Index: VectorIndex;

    /// Opens the index that embeds with `embedding_model` using `api_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index cannot be opened with these credentials.
    async fn open(&self, api_key: &str, embedding_model: &str)
    -> Result<Self::Index, KnowledgeError>;
}

/// An in-process index ranked by shared terms.
///
/// Scores are the number of distinct query terms a chunk contains; chunks
/// sharing no term with the query are never returned. Ties keep insertion
/// order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndex {
    chunks: Arc<RwLock<Vec<Chunk>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored chunks.
    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn add_chunks(&self, chunks: &[Chunk]) -> Result<(), KnowledgeError> {
        self.chunks.write().await.extend_from_slice(chunks);
        Ok(())
    }

    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Chunk>, KnowledgeError> {
        let query_terms = terms(query);
        let chunks = self.chunks.read().await;

        let mut scored: Vec<(usize, usize)> = chunks
            .iter()
            .enumerate()
            .map(|(position, chunk)| {
                let score = terms(&chunk.content).intersection(&query_terms).count();
                (position, score)
            })
            .filter(|(_, score)| *score > 0)
            .collect();
        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(scored
            .into_iter()
            .take(k)
            .filter_map(|(position, _)| chunks.get(position).cloned())
            .collect())
    }
}

/// Hands out one [`InMemoryIndex`] per embedding model.
///
/// Keys are not checked; any non-empty key opens the model's index.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIndexFactory {
    indexes: Arc<RwLock<HashMap<String, InMemoryIndex>>>,
}

impl InMemoryIndexFactory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorIndexFactory for InMemoryIndexFactory {
    type Index = InMemoryIndex;

    async fn open(&self, api_key: &str, embedding_model: &str) -> Result<InMemoryIndex, KnowledgeError> {
        if api_key.trim().is_empty() {
            return Err(KnowledgeError::MissingApiKey.into());
        }
        let mut indexes = self.indexes.write().await;
        Ok(indexes
            .entry(embedding_model.to_string())
            .or_default()
            .clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;

    fn chunk(text: &str) -> Chunk {
        Chunk::from_document(&Document::new(text, "test.txt"), text.to_string(), 0)
    }

    #[tokio::test]
    async fn search_ranks_by_shared_terms() {
        let index = InMemoryIndex::new();
        index
            .add_chunks(&[
                chunk("Cargo builds Rust crates."),
                chunk("Rust ownership rules prevent data races."),
                chunk("Python uses a garbage collector."),
            ])
            .await
            .expect("add");

        let results = index
            .similarity_search("How does Rust prevent data races?", 3)
            .await
            .expect("search");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "Rust ownership rules prevent data races.");
        assert_eq!(results[1].content, "Cargo builds Rust crates.");
    }

    #[tokio::test]
    async fn search_respects_k() {
        let index = InMemoryIndex::new();
        index
            .add_chunks(&[chunk("rust one"), chunk("rust two"), chunk("rust three")])
            .await
            .expect("add");

        let results = index.similarity_search("rust", 2).await.expect("search");

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].content, "rust one");
    }

    #[tokio::test]
    async fn factory_shares_index_per_model() {
        let factory = InMemoryIndexFactory::new();
        let small = factory.open("sk-a", "small").await.expect("open");
        small.add_chunks(&[chunk("shared")]).await.expect("add");

        let same = factory.open("sk-b", "small").await.expect("open");
        let other = factory.open("sk-a", "large").await.expect("open");

        assert_eq!(same.len().await, 1);
        assert!(other.is_empty().await);
    }

    #[tokio::test]
    async fn factory_requires_key() {
        let factory = InMemoryIndexFactory::new();
        let err = factory.open(" ", "small").await.unwrap_err();
        assert_eq!(err.current_context(), &KnowledgeError::MissingApiKey);
    }
}
