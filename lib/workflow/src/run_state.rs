//! Mutable state threaded through one run.
//!
//! A `RunState` is created when a run starts and dropped when it ends. It is
//! never shared between runs, so nodes mutate it freely without locking.

use crate::node::NodeId;
use serde::{Deserialize, Serialize};

/// Scratch record for a single run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunState {
    /// The query as seen by downstream nodes; a UserQuery node may rewrite it.
    pub user_query: String,
    /// Context retrieved by a KnowledgeBase node.
    pub context: Option<String>,
    /// Response produced by an LLM Engine node, including error responses.
    pub llm_response: Option<String>,
    /// Value produced by an Output node.
    pub final_output: Option<FinalOutput>,
    /// Whether a KnowledgeBase node retrieved usable context.
    pub knowledge_processed: bool,
    /// Whether a KnowledgeBase node ran ingestion for uploaded files.
    pub documents_uploaded: bool,
    /// Nodes that completed successfully, in execution order.
    pub executed_node_ids: Vec<NodeId>,
    /// API key used by the KnowledgeBase node that found context.
    pub knowledge_api_key: Option<String>,
    /// Embedding model used by the KnowledgeBase node that found context.
    pub knowledge_embedding_model: Option<String>,
}

impl RunState {
    /// Creates the state for a run over `user_input`.
    #[must_use]
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_query: user_input.into(),
            ..Self::default()
        }
    }

    /// Returns true if context was retrieved.
    #[must_use]
    pub fn context_used(&self) -> bool {
        self.context.is_some()
    }

    /// Returns the metadata flags describing this run so far.
    #[must_use]
    pub fn metadata(&self) -> OutputMetadata {
        OutputMetadata {
            context_used: self.context_used(),
            knowledge_processed: self.knowledge_processed,
            documents_uploaded: self.documents_uploaded,
        }
    }
}

/// Run flags attached to an Output node's response on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMetadata {
    /// Whether context was retrieved.
    pub context_used: bool,
    /// Whether a knowledge base produced usable context.
    pub knowledge_processed: bool,
    /// Whether documents were ingested.
    pub documents_uploaded: bool,
}

/// What an Output node produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FinalOutput {
    /// The plain response text.
    Text(String),
    /// The response with run metadata.
    WithMetadata {
        /// The response text.
        response: String,
        /// Run flags.
        metadata: OutputMetadata,
    },
}

impl FinalOutput {
    /// Returns the response text.
    #[must_use]
    pub fn response(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::WithMetadata { response, .. } => response,
        }
    }

    /// Returns the metadata, if the output carries any.
    #[must_use]
    pub fn metadata(&self) -> Option<&OutputMetadata> {
        match self {
            Self::Text(_) => None,
            Self::WithMetadata { metadata, .. } => Some(metadata),
        }
    }
}

impl From<String> for FinalOutput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}
