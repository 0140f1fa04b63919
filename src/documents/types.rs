//! Core types for documents and their chunks.

use serde::{Deserialize, Serialize};

/// Extracted text of one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Originating file name.
    pub source: String,

    /// Raw extracted text.
    pub text: String,
}

impl Document {
    /// Create a new document.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }

    /// True when the text is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Get the length of the text in characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// A chunk of a document with metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Source identifier inherited from the document.
    pub source: String,

    /// Position of this chunk within its document (0-based).
    pub chunk_index: usize,

    /// Byte range in the document text (start, end).
    pub byte_range: (usize, usize),

    /// The actual text content of this chunk.
    pub content: String,
}

impl Chunk {
    /// Create a new chunk.
    pub fn new(
        source: impl Into<String>,
        chunk_index: usize,
        byte_range: (usize, usize),
        content: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            chunk_index,
            byte_range,
            content: content.into(),
        }
    }

    /// Get a preview of the content (first N characters).
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((end, _)) => &self.content[..end],
            None => &self.content,
        }
    }

    /// Get the length of the content in characters.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}
