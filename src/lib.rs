pub mod cli;
pub mod config;
pub mod documents;
pub mod indexing;
pub mod logging;
pub mod qa;
pub mod store;
pub mod utils;
pub mod vector;

pub use config::Settings;
pub use documents::{Chunk, ChunkingConfig, Document, load_documents, split_documents};
pub use indexing::{IndexReport, index_documents};
pub use qa::{Answer, AnswerSynthesizer, QuestionBatch, RetrievalQa};
pub use store::{SearchResult, StoreError, VectorStore};
pub use vector::{EmbeddingGenerator, FastEmbedGenerator, VectorDimension};
