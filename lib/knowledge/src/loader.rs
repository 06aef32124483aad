//! Reading uploaded files into documents.

use crate::document::Document;
use crate::error::KnowledgeError;
use async_trait::async_trait;
use stackflow_core::Result;
use std::path::Path;

/// Page separator in plain-text exports of paged documents.
const FORM_FEED: char = '\u{c}';

/// Turns a file into documents.
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Loads the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::LoadFailed`] if the file cannot be read or
    /// parsed.
    async fn load(&self, path: &Path) -> Result<Vec<Document>, KnowledgeError>;
}

/// Loads UTF-8 text files.
///
/// Form feeds split the text into pages, the way text extracted from a PDF
/// marks page breaks. Blank pages are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFileLoader;

#[async_trait]
impl DocumentLoader for TextFileLoader {
    async fn load(&self, path: &Path) -> Result<Vec<Document>, KnowledgeError> {
        let source = path.display().to_string();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| KnowledgeError::LoadFailed {
                path: source.clone(),
                reason: e.to_string(),
            })?;

        if !text.contains(FORM_FEED) {
            return Ok(vec![Document::new(text, source)]);
        }

        Ok(text
            .split(FORM_FEED)
            .enumerate()
            .filter(|(_, page)| !page.trim().is_empty())
            .map(|(number, page)| Document::new(page, source.clone()).with_page(number))
            .collect())
    }
}
