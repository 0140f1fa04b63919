use thiserror::Error;

use super::synthesizer::SynthesisError;
use crate::store::StoreError;

/// Batch-level failures. Nothing is answered when one of these occurs.
#[derive(Error, Debug)]
pub enum QaError {
    #[error("No questions provided")]
    EmptyQuestionBatch,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Failed to start question worker pool: {0}")]
    ThreadPool(String),
}

/// Failure of a single question; the rest of the batch is unaffected.
#[derive(Error, Debug)]
pub enum QuestionError {
    #[error("Retrieval failed: {0}")]
    Retrieval(#[source] StoreError),

    #[error("Answer synthesis failed: {0}")]
    SynthesisFailure(#[source] SynthesisError),
}
