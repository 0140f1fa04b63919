use std::path::PathBuf;

use thiserror::Error;

use crate::vector::{EmbeddingError, VectorError, VectorStorageError};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Vector store not initialized at {}. Run 'pdfqa index' first", .0.display())]
    StoreNotInitialized(PathBuf),

    #[error("Embedding failed: {0}")]
    EmbeddingFailure(#[from] EmbeddingError),

    #[error(
        "Another rebuild holds {}. Remove the file if no other pdfqa process is running",
        .0.display()
    )]
    RebuildInProgress(PathBuf),

    #[error("Snapshot is corrupt: {0}")]
    Corrupt(String),

    #[error("Snapshot format version {found} is not supported (expected {expected})")]
    IncompatibleFormat { found: u32, expected: u32 },

    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

impl From<VectorStorageError> for StoreError {
    fn from(err: VectorStorageError) -> Self {
        match err {
            VectorStorageError::Io(e) => StoreError::Io(e),
            VectorStorageError::Vector(e) => StoreError::Vector(e),
            invalid @ VectorStorageError::InvalidFile { .. } => {
                StoreError::Corrupt(invalid.to_string())
            }
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
