//! Vector embeddings and their on-disk representation.

mod embedding;
mod storage;
#[doc(hidden)]
pub mod testing;
mod types;

pub use embedding::{
    EmbeddingError, EmbeddingGenerator, FastEmbedGenerator, models_dir, parse_embedding_model,
};
pub use storage::{
    MmapVectors, VECTOR_FILE_MAGIC, VECTOR_FILE_VERSION, VectorStorageError, write_vectors,
};
pub use types::{VECTOR_DIMENSION_384, VectorDimension, VectorError, cosine_similarity};

// Re-export key types
pub use fastembed::EmbeddingModel;
