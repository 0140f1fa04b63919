//! Memory-mapped vector file.
//!
//! Layout: a 16-byte header (`PQVF`, format version, dimension, count, each
//! a little-endian u32) followed by `count * dimension` little-endian f32
//! values. Files are written once and never modified in place.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use thiserror::Error;

use super::types::{VectorDimension, VectorError, cosine_similarity};

pub const VECTOR_FILE_MAGIC: &[u8; 4] = b"PQVF";
pub const VECTOR_FILE_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;
const F32_LEN: usize = std::mem::size_of::<f32>();

/// Errors from vector file operations.
#[derive(Error, Debug)]
pub enum VectorStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid vector file {path}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    #[error(transparent)]
    Vector(#[from] VectorError),
}

/// Write all vectors to `path` and fsync the file.
pub fn write_vectors(
    path: &Path,
    dimension: VectorDimension,
    vectors: &[Vec<f32>],
) -> Result<(), VectorStorageError> {
    let invalid = |reason: &str| VectorStorageError::InvalidFile {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };
    let dim = u32::try_from(dimension.get()).map_err(|_| invalid("dimension exceeds u32"))?;
    let count = u32::try_from(vectors.len()).map_err(|_| invalid("vector count exceeds u32"))?;

    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(VECTOR_FILE_MAGIC)?;
    writer.write_all(&VECTOR_FILE_VERSION.to_le_bytes())?;
    writer.write_all(&dim.to_le_bytes())?;
    writer.write_all(&count.to_le_bytes())?;

    for vector in vectors {
        dimension.validate_vector(vector)?;
        for value in vector {
            writer.write_all(&value.to_le_bytes())?;
        }
    }

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

/// Read-only view over a vector file.
#[derive(Debug)]
pub struct MmapVectors {
    mmap: Mmap,
    dimension: VectorDimension,
    count: usize,
}

impl MmapVectors {
    /// Map a vector file and validate its header.
    pub fn open(path: &Path) -> Result<Self, VectorStorageError> {
        let invalid = |reason: String| VectorStorageError::InvalidFile {
            path: path.to_path_buf(),
            reason,
        };

        let file = File::open(path)?;
        // SAFETY: vector files belong to published snapshot generations, which
        // are never written again; rebuilds create a new generation directory.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < HEADER_LEN || &mmap[..4] != VECTOR_FILE_MAGIC {
            return Err(invalid("missing PQVF header".to_string()));
        }

        let version = read_u32(&mmap, 4);
        if version != VECTOR_FILE_VERSION {
            return Err(invalid(format!("unsupported format version {version}")));
        }

        let dimension = VectorDimension::new(read_u32(&mmap, 8) as usize)?;
        let count = read_u32(&mmap, 12) as usize;

        let expected = HEADER_LEN + count * dimension.get() * F32_LEN;
        if mmap.len() != expected {
            return Err(invalid(format!(
                "expected {expected} bytes for {count} vectors, found {}",
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            dimension,
            count,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn dimension(&self) -> VectorDimension {
        self.dimension
    }

    /// Decode the vector at `index`.
    pub fn vector(&self, index: usize) -> Option<Vec<f32>> {
        if index >= self.count {
            return None;
        }

        let width = self.dimension.get() * F32_LEN;
        let start = HEADER_LEN + index * width;
        let bytes = &self.mmap[start..start + width];

        Some(
            bytes
                .chunks_exact(F32_LEN)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect(),
        )
    }

    /// Cosine similarity of `query` against every stored vector, in file order.
    pub fn similarities(&self, query: &[f32]) -> Result<Vec<f32>, VectorError> {
        self.dimension.validate_vector(query)?;

        Ok((0..self.count)
            .filter_map(|i| self.vector(i))
            .map(|stored| cosine_similarity(query, &stored))
            .collect())
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}
