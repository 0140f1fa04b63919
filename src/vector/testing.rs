//! Deterministic embedder for tests.
//!
//! Shared by the unit tests and the integration tests under `tests/`.

use super::embedding::{EmbeddingError, EmbeddingGenerator};
use super::types::VectorDimension;

/// Bag-of-words hashing embedder: identical texts get identical vectors,
/// texts sharing words get positive similarity.
pub struct KeywordEmbedder {
    dimension: VectorDimension,
    poison: Option<String>,
}

impl KeywordEmbedder {
    /// A zero dimension is raised to 1.
    pub fn new(dimension: usize) -> Self {
        let dimension = VectorDimension::new(dimension.max(1))
            .unwrap_or_else(|_| VectorDimension::dimension_384());
        Self {
            dimension,
            poison: None,
        }
    }

    /// Fail whenever a text contains `marker`.
    pub fn failing_on(dimension: usize, marker: &str) -> Self {
        Self {
            poison: Some(marker.to_string()),
            ..Self::new(dimension)
        }
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let buckets = self.dimension.get();
        let mut vector = vec![0.0f32; buckets];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let mut hash: u64 = 0xcbf29ce484222325;
            for byte in word.to_lowercase().bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(0x100000001b3);
            }
            vector[(hash % buckets as u64) as usize] += 1.0;
        }
        vector
    }
}

impl EmbeddingGenerator for KeywordEmbedder {
    fn generate_embeddings(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if let Some(marker) = &self.poison
            && texts.iter().any(|t| t.contains(marker.as_str()))
        {
            return Err(EmbeddingError::Generation(format!("refused: {marker}")));
        }
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::cosine_similarity;

    #[test]
    fn test_shared_words_score_higher() {
        let embedder = KeywordEmbedder::new(64);
        let vectors = embedder
            .generate_embeddings(&["lost badges desk", "Lost badges", "flour and yeast"])
            .unwrap();

        assert_eq!(vectors[0].len(), 64);
        assert_eq!(vectors[0].iter().sum::<f32>(), 3.0);
        let related = cosine_similarity(&vectors[0], &vectors[1]);
        let unrelated = cosine_similarity(&vectors[0], &vectors[2]);
        assert!(related > unrelated);
    }

    #[test]
    fn test_marker_fails_whole_batch() {
        let embedder = KeywordEmbedder::failing_on(8, "poison");
        assert!(embedder.generate_embeddings(&["fine", "poison pill"]).is_err());
        assert!(embedder.embed_one("fine").is_ok());
        assert_eq!(KeywordEmbedder::new(0).dimension().get(), 1);
    }
}
