//! Knowledge base support for stackflow.
//!
//! This crate implements the engine's `DocumentIngestor` and
//! `ContextRetriever` capabilities:
//!
//! - **Loader**: reads uploaded files into documents
//! - **Splitter**: cuts documents into overlapping chunks
//! - **Index**: the vector index seam and an in-process implementation
//! - **Knowledge base**: ties loading, splitting, and search together

pub mod document;
pub mod error;
pub mod index;
pub mod knowledge_base;
pub mod loader;
pub mod splitter;

pub use document::{Chunk, Document};
pub use error::KnowledgeError;
pub use index::{InMemoryIndex, InMemoryIndexFactory, VectorIndex, VectorIndexFactory};
pub use knowledge_base::KnowledgeBase;
pub use loader::{DocumentLoader, TextFileLoader};
pub use splitter::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, TextSplitter};
