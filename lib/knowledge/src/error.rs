//! Error types for the knowledge crate.

use std::fmt;

/// Errors from document ingestion and retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KnowledgeError {
    /// The embedding provider needs a key and none was given.
    MissingApiKey,
    /// A document could not be read.
    LoadFailed { path: String, reason: String },
    /// The vector index rejected an operation.
    IndexFailed { reason: String },
    /// Splitter settings are inconsistent.
    InvalidSplitter {
        chunk_size: usize,
        chunk_overlap: usize,
    },
}

impl fmt::Display for KnowledgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "API key is required for document processing"),
            Self::LoadFailed { path, reason } => {
                write!(f, "failed to load {path}: {reason}")
            }
            Self::IndexFailed { reason } => write!(f, "vector index error: {reason}"),
            Self::InvalidSplitter {
                chunk_size,
                chunk_overlap,
            } => write!(
                f,
                "chunk overlap {chunk_overlap} must be smaller than chunk size {chunk_size}"
            ),
        }
    }
}

impl std::error::Error for KnowledgeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knowledge_error_display() {
        let err = KnowledgeError::LoadFailed {
            path: "/tmp/missing.txt".to_string(),
            reason: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "failed to load /tmp/missing.txt: not found");
        assert!(
            KnowledgeError::InvalidSplitter {
                chunk_size: 10,
                chunk_overlap: 20
            }
            .to_string()
            .contains("20")
        );
    }
}
