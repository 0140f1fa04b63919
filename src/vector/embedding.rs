//! Embedding generation.
//!
//! `EmbeddingGenerator` is the seam between the store and whatever model
//! turns text into vectors. `FastEmbedGenerator` runs a local ONNX model
//! through fastembed.

use std::path::PathBuf;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use parking_lot::Mutex;
use thiserror::Error;

use super::types::{VectorDimension, VectorError};

/// Error type for embedding operations
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Failed to initialize embedding model: {0}")]
    ModelInit(String),

    #[error("Unknown embedding model '{0}'")]
    UnknownModel(String),

    #[error("Failed to generate embedding: {0}")]
    Generation(String),

    #[error("Expected {expected} embeddings, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Dimension(#[from] VectorError),
}

/// Maps text to fixed-dimension vectors.
///
/// The same generator (same model) must be used to build a store and to
/// query it.
pub trait EmbeddingGenerator: Send + Sync {
    /// Embed a batch of texts, one vector per input, in input order.
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Dimension of every vector this generator produces.
    fn dimension(&self) -> VectorDimension;

    /// Name recorded in snapshot manifests.
    fn model_name(&self) -> &str;

    /// Embed a single text.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut embeddings = self.generate_embeddings(&[text])?;
        if embeddings.len() != 1 {
            return Err(EmbeddingError::CountMismatch {
                expected: 1,
                actual: embeddings.len(),
            });
        }
        let embedding = embeddings.remove(0);
        self.dimension().validate_vector(&embedding)?;
        Ok(embedding)
    }
}

/// Parse a configured model name.
pub fn parse_embedding_model(name: &str) -> Result<EmbeddingModel, EmbeddingError> {
    match name {
        "AllMiniLML6V2" => Ok(EmbeddingModel::AllMiniLML6V2),
        "AllMiniLML12V2" => Ok(EmbeddingModel::AllMiniLML12V2),
        "BGESmallENV15" => Ok(EmbeddingModel::BGESmallENV15),
        "BGEBaseENV15" => Ok(EmbeddingModel::BGEBaseENV15),
        "MultilingualE5Small" => Ok(EmbeddingModel::MultilingualE5Small),
        "NomicEmbedTextV15" => Ok(EmbeddingModel::NomicEmbedTextV15),
        other => Err(EmbeddingError::UnknownModel(other.to_string())),
    }
}

/// Default directory for downloaded model files.
pub fn models_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("pdfqa")
        .join("models")
}

/// Local embedding model backed by fastembed.
pub struct FastEmbedGenerator {
    /// The embedding model (fastembed needs `&mut` to embed)
    model: Mutex<TextEmbedding>,
    dimension: VectorDimension,
    model_name: String,
}

impl std::fmt::Debug for FastEmbedGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedGenerator")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl FastEmbedGenerator {
    /// Create a generator with the default model (AllMiniLML6V2).
    pub fn new() -> Result<Self, EmbeddingError> {
        Self::from_settings("AllMiniLML6V2", None, true)
    }

    /// Create a generator from configured values.
    pub fn from_settings(
        model_name: &str,
        cache_dir: Option<PathBuf>,
        show_download_progress: bool,
    ) -> Result<Self, EmbeddingError> {
        let model = parse_embedding_model(model_name)?;
        let cache_dir = cache_dir.unwrap_or_else(models_dir);

        tracing::info!(
            target: "embedding",
            "loading embedding model {model_name} (cache: {})",
            cache_dir.display()
        );

        let mut text_model = TextEmbedding::try_new(
            InitOptions::new(model)
                .with_cache_dir(cache_dir)
                .with_show_download_progress(show_download_progress),
        )
        .map_err(|e| EmbeddingError::ModelInit(e.to_string()))?;

        // Get dimensions by generating a test embedding
        let probe = text_model
            .embed(vec!["test"], None)
            .map_err(|e| EmbeddingError::Generation(e.to_string()))?;
        let width = probe.first().map_or(0, Vec::len);
        let dimension = VectorDimension::new(width)?;

        tracing::info!(target: "embedding", "embedding model ready: {dimension} dimensions");

        Ok(Self {
            model: Mutex::new(text_model),
            dimension,
            model_name: model_name.to_string(),
        })
    }
}

impl EmbeddingGenerator for FastEmbedGenerator {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self
            .model
            .lock()
            .embed(texts.to_vec(), None)
            .map_err(|e| EmbeddingError::Generation(e.to_string()))?;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            });
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::testing::KeywordEmbedder;

    #[test]
    fn test_parse_embedding_model() {
        assert!(matches!(
            parse_embedding_model("AllMiniLML6V2"),
            Ok(EmbeddingModel::AllMiniLML6V2)
        ));
        assert!(matches!(
            parse_embedding_model("gpt-embeddings"),
            Err(EmbeddingError::UnknownModel(name)) if name == "gpt-embeddings"
        ));
    }

    #[test]
    fn test_embed_one_validates_dimension() {
        let embedder = KeywordEmbedder::new(16);
        let vector = embedder.embed_one("hello world").unwrap();
        assert_eq!(vector.len(), 16);
    }

    #[test]
    fn test_models_dir_is_namespaced() {
        assert!(models_dir().ends_with("pdfqa/models"));
    }
}
