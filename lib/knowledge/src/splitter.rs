//! Recursive character text splitting.
//!
//! Text is cut on the coarsest separator that occurs in it (paragraphs,
//! then lines, then words, then single characters), and the pieces are
//! packed greedily into chunks of at most `chunk_size` characters. Adjacent
//! chunks share up to `chunk_overlap` characters of context. Lengths are
//! counted in characters, not bytes.

use crate::document::{Chunk, Document};
use crate::error::KnowledgeError;
use std::collections::VecDeque;

/// Default maximum chunk length.
pub const DEFAULT_CHUNK_SIZE: usize = 1000;
/// Default overlap between neighbouring chunks.
pub const DEFAULT_CHUNK_OVERLAP: usize = 200;

const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Splits documents into overlapping chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl TextSplitter {
    /// Creates a splitter.
    ///
    /// # Errors
    ///
    /// Returns [`KnowledgeError::InvalidSplitter`] unless
    /// `chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self, KnowledgeError> {
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(KnowledgeError::InvalidSplitter {
                chunk_size,
                chunk_overlap,
            });
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[must_use]
    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Splits `text` into chunk strings.
    #[must_use]
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    /// Splits every document, recording where each chunk starts.
    #[must_use]
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|document| self.split_document(document))
            .collect()
    }

    fn split_document(&self, document: &Document) -> Vec<Chunk> {
        let text = document.content.as_str();
        let mut index: usize = 0;
        let mut previous_len: usize = 0;

        self.split_text(text)
            .into_iter()
            .map(|content| {
                // Search from where this chunk can begin at the earliest,
                // given the previous chunk and the overlap.
                let from = (index + previous_len).saturating_sub(self.chunk_overlap);
                let from_byte = byte_offset(text, from);
                index = text[from_byte..]
                    .find(content.as_str())
                    .map_or(from, |pos| from + char_len(&text[from_byte..from_byte + pos]));
                previous_len = char_len(&content);
                Chunk::from_document(document, content, index)
            })
            .collect()
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let position = separators
            .iter()
            .position(|sep| sep.is_empty() || text.contains(sep))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(position).copied().unwrap_or("");
        let finer = separators.get(position + 1..).unwrap_or(&[]);

        let mut chunks = Vec::new();
        let mut fitting = Vec::new();

        for piece in split_keeping_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                fitting.push(piece);
                continue;
            }
            if !fitting.is_empty() {
                chunks.extend(self.merge(&fitting));
                fitting.clear();
            }
            if finer.is_empty() {
                let trimmed = piece.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            } else {
                chunks.extend(self.split_with(piece, finer));
            }
        }

        if !fitting.is_empty() {
            chunks.extend(self.merge(&fitting));
        }
        chunks
    }

    /// Packs pieces into chunks, carrying trailing pieces over as overlap.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size && !window.is_empty() {
                if let Some(chunk) = join(&window) {
                    chunks.push(chunk);
                }
                while total > self.chunk_overlap || (total + len > self.chunk_size && total > 0) {
                    let Some(dropped) = window.pop_front() else {
                        break;
                    };
                    total -= char_len(dropped);
                }
            }
            window.push_back(piece);
            total += len;
        }

        if let Some(chunk) = join(&window) {
            chunks.push(chunk);
        }
        chunks
    }
}

/// Splits on `separator`, keeping it at the start of the following piece.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    for (at, _) in text.match_indices(separator) {
        if at > start {
            pieces.push(&text[start..at]);
        }
        start = at;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn join(window: &VecDeque<&str>) -> Option<String> {
    let joined: String = window.iter().copied().collect();
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(byte, _)| byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_overlap_not_smaller_than_size() {
        assert!(TextSplitter::new(10, 10).is_err());
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(10, 9).is_ok());
    }

    #[test]
    fn default_uses_thousand_with_two_hundred_overlap() {
        let splitter = TextSplitter::default();
        assert_eq!(splitter.chunk_size(), 1000);
        assert_eq!(splitter.chunk_overlap(), 200);
    }

    #[test]
    fn short_text_is_one_chunk() {
        let splitter = TextSplitter::default();
        assert_eq!(
            splitter.split_text("para one.\n\npara two."),
            vec!["para one.\n\npara two."]
        );
    }

    #[test]
    fn words_are_packed_without_overlap() {
        let splitter = TextSplitter::new(10, 0).expect("splitter");
        assert_eq!(
            splitter.split_text("aaaa bbbb cccc dddd"),
            vec!["aaaa bbbb", "cccc dddd"]
        );
    }

    #[test]
    fn overlap_repeats_trailing_words() {
        let splitter = TextSplitter::new(10, 5).expect("splitter");
        assert_eq!(
            splitter.split_text("aaaa bbbb cccc dddd"),
            vec!["aaaa bbbb", "bbbb cccc", "cccc dddd"]
        );
    }

    #[test]
    fn long_words_fall_back_to_characters() {
        let splitter = TextSplitter::new(4, 0).expect("splitter");
        assert_eq!(splitter.split_text("abcdefghij"), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn whitespace_pieces_never_become_chunks() {
        let splitter = TextSplitter::new(1, 0).expect("splitter");
        assert_eq!(splitter.split_text("a b"), vec!["a", "b"]);
    }

    #[test]
    fn paragraphs_split_before_lines() {
        let splitter = TextSplitter::new(12, 0).expect("splitter");
        assert_eq!(
            splitter.split_text("first para\n\nsecond one"),
            vec!["first para", "second one"]
        );
    }

    #[test]
    fn chunks_never_exceed_size() {
        let splitter = TextSplitter::new(50, 10).expect("splitter");
        let text = "Rust is a multi-paradigm language. ".repeat(20);
        let chunks = splitter.split_text(&text);

        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 50));
    }

    #[test]
    fn documents_record_start_index() {
        let splitter = TextSplitter::new(10, 5).expect("splitter");
        let document = Document::new("aaaa bbbb cccc dddd", "notes.txt").with_page(3);

        let chunks = splitter.split_documents(&[document]);

        let starts: Vec<usize> = chunks.iter().map(|c| c.start_index).collect();
        assert_eq!(starts, vec![0, 5, 10]);
        assert!(chunks.iter().all(|c| c.source == "notes.txt" && c.page == Some(3)));
        assert_ne!(chunks[0].id, chunks[1].id);
    }

    #[test]
    fn start_index_counts_characters() {
        let splitter = TextSplitter::new(6, 0).expect("splitter");
        let document = Document::new("héllo wörld", "unicode.txt");

        let chunks = splitter.split_documents(&[document]);

        assert_eq!(chunks[0].content, "héllo");
        assert_eq!(chunks[1].content, "wörld");
        assert_eq!(chunks[1].start_index, 6);
    }
}
