//! Vector primitives: dimensions and similarity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dimension of the all-MiniLM-L6-v2 embedding model.
pub const VECTOR_DIMENSION_384: usize = 384;

/// Errors from vector validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VectorError {
    #[error("Invalid vector dimension {dimension}: must be greater than zero")]
    InvalidDimension { dimension: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Fixed length of every vector in one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VectorDimension(usize);

impl VectorDimension {
    /// Create a dimension, rejecting zero.
    pub fn new(dimension: usize) -> Result<Self, VectorError> {
        if dimension == 0 {
            return Err(VectorError::InvalidDimension { dimension });
        }
        Ok(Self(dimension))
    }

    /// Dimension of the default embedding model.
    pub fn dimension_384() -> Self {
        Self(VECTOR_DIMENSION_384)
    }

    pub fn get(&self) -> usize {
        self.0
    }

    /// Check that a vector has exactly this dimension.
    pub fn validate_vector(&self, vector: &[f32]) -> Result<(), VectorError> {
        if vector.len() != self.0 {
            return Err(VectorError::DimensionMismatch {
                expected: self.0,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for VectorDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Returns 0.0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        // Identical vectors
        let v1 = vec![1.0, 0.0, 0.0];
        let v2 = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&v1, &v2) - 1.0).abs() < 0.001);

        // Orthogonal vectors
        let v3 = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&v1, &v3) - 0.0).abs() < 0.001);

        // Opposite vectors
        let v4 = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&v1, &v4) - (-1.0)).abs() < 0.001);

        // Zero vector
        assert_eq!(cosine_similarity(&v1, &[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_vector_dimension() {
        let dim = VectorDimension::dimension_384();
        assert_eq!(dim.get(), 384);

        assert!(matches!(
            VectorDimension::new(0),
            Err(VectorError::InvalidDimension { .. })
        ));

        assert!(dim.validate_vector(&vec![0.1; 384]).is_ok());
        assert_eq!(
            dim.validate_vector(&vec![0.1; 100]),
            Err(VectorError::DimensionMismatch {
                expected: 384,
                actual: 100
            })
        );
    }
}
