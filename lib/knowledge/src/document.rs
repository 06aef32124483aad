//! Documents and the chunks cut from them.

use serde::{Deserialize, Serialize};
use stackflow_core::DocumentId;

/// Text read from one page (or the whole) of a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Extracted text.
    pub content: String,
    /// Where the text came from.
    pub source: String,
    /// Zero-based page number, for paged formats.
    pub page: Option<usize>,
}

impl Document {
    /// Creates a document.
    #[must_use]
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            page: None,
        }
    }

    /// Sets the page number.
    #[must_use]
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }
}

/// A piece of a document small enough to embed and index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: DocumentId,
    pub content: String,
    pub source: String,
    pub page: Option<usize>,
    /// Character offset of the chunk within its document.
    pub start_index: usize,
}

impl Chunk {
    /// Creates a chunk of `document` starting at character `start_index`.
    #[must_use]
    pub fn from_document(document: &Document, content: String, start_index: usize) -> Self {
        Self {
            id: DocumentId::new(),
            content,
            source: document.source.clone(),
            page: document.page,
            start_index,
        }
    }
}
