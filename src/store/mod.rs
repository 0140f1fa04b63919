//! Persistent vector store for document chunks.

mod error;
mod lock;
mod snapshot;
mod vector_store;

pub use error::{StoreError, StoreResult};
pub use snapshot::{Manifest, SNAPSHOT_FORMAT_VERSION, SearchResult, Snapshot};
pub use vector_store::{
    EMBEDDING_BATCH_SIZE, IndexProgress, RebuildStats, VECTOR_STORE_DIR, VectorStore,
};
