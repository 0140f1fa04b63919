//! Indexing pipeline: split documents into chunks and rebuild the store.

use thiserror::Error;

use crate::documents::{ChunkingConfig, Document, split_documents};
use crate::store::{IndexProgress, RebuildStats, StoreError, VectorStore};
use crate::vector::EmbeddingGenerator;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Invalid chunking configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of an indexing run.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexReport {
    pub documents: usize,
    /// Documents that produced no chunks.
    pub blank_documents: usize,
    pub chunks: usize,
    pub stats: RebuildStats,
}

/// Chunk `documents` and replace the store contents with them.
///
/// An empty document list is not an error: it publishes an empty snapshot.
pub fn index_documents<F>(
    documents: &[Document],
    chunking: &ChunkingConfig,
    store: &VectorStore,
    embedder: &dyn EmbeddingGenerator,
    batch_size: usize,
    on_progress: F,
) -> Result<IndexReport, IndexError>
where
    F: FnMut(IndexProgress),
{
    chunking.validate().map_err(IndexError::InvalidConfig)?;

    if documents.is_empty() {
        tracing::warn!(target: "store", "no documents provided; publishing an empty snapshot");
    }

    let chunks = split_documents(documents, chunking);
    let blank_documents = documents.iter().filter(|d| d.is_blank()).count();

    tracing::info!(
        target: "chunker",
        "{} documents -> {} chunks (size {}, overlap {})",
        documents.len(),
        chunks.len(),
        chunking.chunk_size,
        chunking.chunk_overlap
    );

    let stats = store.rebuild_with_progress(&chunks, embedder, batch_size, on_progress)?;

    Ok(IndexReport {
        documents: documents.len(),
        blank_documents,
        chunks: chunks.len(),
        stats,
    })
}
