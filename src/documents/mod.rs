//! Documents: loading source files and splitting them into chunks.

pub mod chunker;
pub mod config;
pub mod loader;
pub mod types;

pub use chunker::{Chunker, RawChunk, RecursiveChunker, split_documents};
pub use config::ChunkingConfig;
pub use loader::{LoadError, SUPPORTED_EXTENSIONS, load_document, load_documents};
pub use types::{Chunk, Document};
