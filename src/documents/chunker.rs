//! Document chunking strategies.
//!
//! Provides the `Chunker` trait and the recursive splitter that breaks
//! documents into overlapping windows suitable for embedding.

use std::collections::VecDeque;

use super::config::ChunkingConfig;
use super::types::{Chunk, Document};

/// A raw chunk before being attached to its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawChunk {
    /// Byte range in the source text (start, end).
    pub byte_range: (usize, usize),

    /// The text content of this chunk.
    pub content: String,
}

impl RawChunk {
    /// Create a new raw chunk.
    pub fn new(byte_range: (usize, usize), content: String) -> Self {
        Self {
            byte_range,
            content,
        }
    }

    /// Get character count.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Trait for document chunking strategies.
pub trait Chunker: Send + Sync {
    /// Split one text into chunks.
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Vec<RawChunk>;

    /// Split documents into chunks.
    ///
    /// Chunks keep the source of their document and come out in document
    /// order. Blank documents contribute nothing.
    fn split(&self, documents: &[Document], config: &ChunkingConfig) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for document in documents {
            if document.is_blank() {
                tracing::debug!(target: "chunker", "skipping blank document {}", document.source);
                continue;
            }

            let raw_chunks = self.chunk(&document.text, config);
            tracing::debug!(
                target: "chunker",
                "{}: {} chars -> {} chunks",
                document.source,
                document.char_count(),
                raw_chunks.len()
            );

            chunks.extend(raw_chunks.into_iter().enumerate().map(|(index, raw)| {
                Chunk::new(document.source.clone(), index, raw.byte_range, raw.content)
            }));
        }

        chunks
    }
}

/// Split documents with the default recursive chunker.
pub fn split_documents(documents: &[Document], config: &ChunkingConfig) -> Vec<Chunk> {
    RecursiveChunker::new().split(documents, config)
}

/// Recursive character splitter.
///
/// Algorithm:
/// 1. Pick the first separator (paragraph, line, word, character) present in the text
/// 2. Split on it, keeping the separator at the start of the following piece
/// 3. Greedily merge pieces shorter than `chunk_size` into windows,
///    carrying up to `chunk_overlap` characters into the next window
/// 4. Recurse into pieces that are still too long with the finer separators
/// 5. Trim each window and drop empty ones
#[derive(Debug, Default)]
pub struct RecursiveChunker;

impl RecursiveChunker {
    /// Create a new recursive chunker.
    pub fn new() -> Self {
        Self
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, content: &str, config: &ChunkingConfig) -> Vec<RawChunk> {
        if content.trim().is_empty() {
            return Vec::new();
        }

        let whole = Span {
            start: 0,
            end: content.len(),
            chars: content.chars().count(),
        };

        let mut ranges = Vec::new();
        split_span(content, whole, &config.separators, config, &mut ranges);

        ranges
            .into_iter()
            .map(|(start, end)| RawChunk::new((start, end), content[start..end].to_string()))
            .collect()
    }
}

/// A contiguous slice of the source text.
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    chars: usize,
}

fn split_span(
    content: &str,
    span: Span,
    separators: &[String],
    config: &ChunkingConfig,
    out: &mut Vec<(usize, usize)>,
) {
    let (separator, finer) = pick_separator(&content[span.start..span.end], separators);
    let pieces = split_keeping_separator(content, span, separator);

    let mut small = Vec::new();
    for piece in pieces {
        if piece.chars < config.chunk_size {
            small.push(piece);
            continue;
        }

        if !small.is_empty() {
            merge_pieces(content, &small, config, out);
            small.clear();
        }

        if finer.is_empty() {
            push_trimmed(content, piece, out);
        } else {
            split_span(content, piece, finer, config, out);
        }
    }

    if !small.is_empty() {
        merge_pieces(content, &small, config, out);
    }
}

/// First separator occurring in `text`, plus the separators after it.
fn pick_separator<'s>(text: &str, separators: &'s [String]) -> (&'s str, &'s [String]) {
    for (i, separator) in separators.iter().enumerate() {
        if separator.is_empty() {
            return ("", &[]);
        }
        if text.contains(separator.as_str()) {
            return (separator, &separators[i + 1..]);
        }
    }

    (separators.last().map_or("", String::as_str), &[])
}

fn split_keeping_separator(content: &str, span: Span, separator: &str) -> Vec<Span> {
    let text = &content[span.start..span.end];

    if separator.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| Span {
                start: span.start + i,
                end: span.start + i + c.len_utf8(),
                chars: 1,
            })
            .collect();
    }

    let mut bounds: Vec<usize> = std::iter::once(0)
        .chain(text.match_indices(separator).map(|(i, _)| i))
        .collect();
    bounds.push(text.len());

    bounds
        .windows(2)
        .filter(|pair| pair[0] < pair[1])
        .map(|pair| Span {
            start: span.start + pair[0],
            end: span.start + pair[1],
            chars: text[pair[0]..pair[1]].chars().count(),
        })
        .collect()
}

fn merge_pieces(
    content: &str,
    pieces: &[Span],
    config: &ChunkingConfig,
    out: &mut Vec<(usize, usize)>,
) {
    let mut window: VecDeque<Span> = VecDeque::new();
    let mut total = 0;

    for &piece in pieces {
        if total + piece.chars > config.chunk_size {
            if let (Some(&first), Some(&last)) = (window.front(), window.back()) {
                push_trimmed(
                    content,
                    Span {
                        start: first.start,
                        end: last.end,
                        chars: total,
                    },
                    out,
                );

                // Keep at most `chunk_overlap` characters for the next window
                while total > config.chunk_overlap
                    || (total + piece.chars > config.chunk_size && total > 0)
                {
                    match window.pop_front() {
                        Some(dropped) => total -= dropped.chars,
                        None => break,
                    }
                }
            }
        }

        total += piece.chars;
        window.push_back(piece);
    }

    if let (Some(&first), Some(&last)) = (window.front(), window.back()) {
        push_trimmed(
            content,
            Span {
                start: first.start,
                end: last.end,
                chars: total,
            },
            out,
        );
    }
}

fn push_trimmed(content: &str, span: Span, out: &mut Vec<(usize, usize)>) {
    let text = &content[span.start..span.end];
    let without_lead = text.trim_start();
    let trimmed = without_lead.trim_end();
    if trimmed.is_empty() {
        return;
    }

    let start = span.start + (text.len() - without_lead.len());
    out.push((start, start + trimmed.len()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(chunk_size: usize, chunk_overlap: usize) -> ChunkingConfig {
        ChunkingConfig::new(chunk_size, chunk_overlap)
    }

    #[test]
    fn test_empty_content() {
        let chunker = RecursiveChunker::new();
        assert!(chunker.chunk("", &ChunkingConfig::default()).is_empty());
        assert!(chunker.chunk("  \n\n \t", &ChunkingConfig::default()).is_empty());
    }

    #[test]
    fn test_single_short_text() {
        let chunker = RecursiveChunker::new();
        let content = "  A single paragraph with enough text to be meaningful.\n";
        let chunks = chunker.chunk(content, &ChunkingConfig::default());

        assert_eq!(chunks.len(), 1);
        assert_eq!(
            chunks[0].content,
            "A single paragraph with enough text to be meaningful."
        );
    }

    #[test]
    fn test_identical_characters_split_with_overlap() {
        let chunker = RecursiveChunker::new();
        let content = "A".repeat(2500);
        let chunks = chunker.chunk(&content, &ChunkingConfig::default());

        assert_eq!(chunks.len(), 3);
        let lengths: Vec<usize> = chunks.iter().map(RawChunk::char_count).collect();
        assert_eq!(lengths, vec![1000, 1000, 800]);
        assert_eq!(chunks[0].byte_range, (0, 1000));
        assert_eq!(chunks[1].byte_range, (850, 1850));
        assert_eq!(chunks[2].byte_range, (1700, 2500));
    }

    #[test]
    fn test_adjacent_chunks_share_overlap() {
        let chunker = RecursiveChunker::new();
        let content: String = (0..3000)
            .map(|i| char::from(b'a' + (i % 26) as u8))
            .collect();
        let config = ChunkingConfig::default();
        let chunks = chunker.chunk(&content, &config);

        assert!(chunks.len() > 1);
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].content.chars().collect();
            let next: Vec<char> = pair[1].content.chars().collect();
            let tail = &prev[prev.len() - config.chunk_overlap..];
            let head = &next[..config.chunk_overlap];
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let chunker = RecursiveChunker::new();
        let first = format!("First {}", "alpha ".repeat(100).trim_end());
        let second = format!("Second {}", "beta ".repeat(100).trim_end());
        let content = format!("{first}\n\n{second}");
        let chunks = chunker.chunk(&content, &ChunkingConfig::default());

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content, first);
        assert_eq!(chunks[1].content, second);
    }

    #[test]
    fn test_merges_small_paragraphs() {
        let chunker = RecursiveChunker::new();
        let content = "Tiny.\n\nAlso tiny.\n\nA third short paragraph.";
        let chunks = chunker.chunk(content, &ChunkingConfig::default());

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, content);
    }

    #[test]
    fn test_falls_back_to_words() {
        let chunker = RecursiveChunker::new();
        let content = "word ".repeat(100);
        let config = small_config(100, 20);
        let chunks = chunker.chunk(&content, &config);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.char_count() <= config.chunk_size);
            assert!(!chunk.content.starts_with(' '));
            assert!(!chunk.content.contains("wo rd"));
        }
        for pair in chunks.windows(2) {
            assert!(pair[1].byte_range.0 < pair[0].byte_range.1, "windows should overlap");
        }
    }

    #[test]
    fn test_byte_ranges_match_content() {
        let chunker = RecursiveChunker::new();
        let content = "First paragraph.\n\nSecond paragraph with ünïcödé.\nAnd a line. ".repeat(40);
        let chunks = chunker.chunk(&content, &small_config(120, 30));

        for chunk in &chunks {
            let (start, end) = chunk.byte_range;
            assert!(start < end);
            assert!(end <= content.len());
            assert_eq!(&content[start..end], chunk.content);
        }
    }

    #[test]
    fn test_multibyte_hard_cut() {
        let chunker = RecursiveChunker::new();
        let content = "é".repeat(2500);
        let chunks = chunker.chunk(&content, &ChunkingConfig::default());

        let lengths: Vec<usize> = chunks.iter().map(RawChunk::char_count).collect();
        assert_eq!(lengths, vec![1000, 1000, 800]);
    }

    #[test]
    fn test_split_keeps_sources_and_order() {
        let documents = vec![
            Document::new("a.pdf", "B".repeat(1200)),
            Document::new("blank.pdf", "   \n"),
            Document::new("b.pdf", "short text"),
        ];
        let chunks = split_documents(&documents, &ChunkingConfig::default());

        let sources: Vec<&str> = chunks.iter().map(|c| c.source.as_str()).collect();
        assert_eq!(sources, vec!["a.pdf", "a.pdf", "b.pdf"]);
        let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
        assert_eq!(indices, vec![0, 1, 0]);
        assert_eq!(chunks[2].content, "short text");
    }

    #[test]
    fn test_split_no_documents() {
        assert!(split_documents(&[], &ChunkingConfig::default()).is_empty());
    }
}
