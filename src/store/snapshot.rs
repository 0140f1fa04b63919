//! One published generation of the vector store.
//!
//! A generation directory holds `manifest.json`, `chunks.json` and
//! `vectors.bin`. Chunks are loaded into memory, vectors are memory-mapped.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::{StoreError, StoreResult};
use crate::documents::Chunk;
use crate::utils::calculate_hash;
use crate::vector::{EmbeddingGenerator, MmapVectors, VectorDimension};

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

pub(crate) const CURRENT_FILE: &str = "CURRENT";
pub(crate) const MANIFEST_FILE: &str = "manifest.json";
pub(crate) const CHUNKS_FILE: &str = "chunks.json";
pub(crate) const VECTORS_FILE: &str = "vectors.bin";
const GENERATION_PREFIX: &str = "snapshot-";

/// Metadata describing a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub format_version: u32,
    pub generation: u64,
    /// Embedding model the vectors were produced with.
    pub model: String,
    pub dimension: usize,
    pub chunk_count: usize,
    pub document_count: usize,
    /// Distinct sources in index order.
    pub sources: Vec<String>,
    /// Unix timestamp (UTC seconds).
    pub created_at: u64,
    /// SHA256 of `chunks.json`.
    pub chunks_sha256: String,
}

impl Manifest {
    pub(crate) fn read(dir: &Path) -> StoreResult<Self> {
        let manifest: Manifest = serde_json::from_slice(&fs::read(dir.join(MANIFEST_FILE))?)?;
        if manifest.format_version != SNAPSHOT_FORMAT_VERSION {
            return Err(StoreError::IncompatibleFormat {
                found: manifest.format_version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }
        Ok(manifest)
    }
}

/// A retrieved chunk with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub similarity: f32,
}

pub(crate) fn generation_dir_name(generation: u64) -> String {
    format!("{GENERATION_PREFIX}{generation:06}")
}

pub(crate) fn parse_generation(name: &str) -> Option<u64> {
    name.strip_prefix(GENERATION_PREFIX)?.parse().ok()
}

/// Name of the live generation, or `None` before the first rebuild.
pub(crate) fn read_current(root: &Path) -> StoreResult<Option<String>> {
    match fs::read_to_string(root.join(CURRENT_FILE)) {
        Ok(content) => {
            let name = content.trim();
            if parse_generation(name).is_none() {
                return Err(StoreError::Corrupt(format!(
                    "{CURRENT_FILE} names '{name}', not a snapshot generation"
                )));
            }
            Ok(Some(name.to_string()))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read-only view of one generation.
#[derive(Debug)]
pub struct Snapshot {
    dir: PathBuf,
    manifest: Manifest,
    chunks: Vec<Chunk>,
    vectors: MmapVectors,
}

impl Snapshot {
    /// Open and verify a generation directory.
    pub(crate) fn open_dir(dir: &Path) -> StoreResult<Self> {
        let manifest = Manifest::read(dir)?;

        let chunk_bytes = fs::read(dir.join(CHUNKS_FILE))?;
        if calculate_hash(&chunk_bytes) != manifest.chunks_sha256 {
            return Err(StoreError::Corrupt(format!(
                "{CHUNKS_FILE} in {} does not match its manifest checksum",
                dir.display()
            )));
        }
        let chunks: Vec<Chunk> = serde_json::from_slice(&chunk_bytes)?;

        let vectors = MmapVectors::open(&dir.join(VECTORS_FILE))?;
        if vectors.len() != chunks.len() || chunks.len() != manifest.chunk_count {
            return Err(StoreError::Corrupt(format!(
                "{} chunks, {} vectors, manifest says {}",
                chunks.len(),
                vectors.len(),
                manifest.chunk_count
            )));
        }
        if vectors.dimension().get() != manifest.dimension {
            return Err(StoreError::Corrupt(format!(
                "vectors have dimension {}, manifest says {}",
                vectors.dimension(),
                manifest.dimension
            )));
        }

        tracing::debug!(
            target: "store",
            "opened {} ({} chunks)",
            dir.display(),
            chunks.len()
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            manifest,
            chunks,
            vectors,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimension(&self) -> VectorDimension {
        self.vectors.dimension()
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// The `k` chunks most similar to `query_vector`, nearest first.
    ///
    /// Equal scores keep snapshot order.
    pub fn search(&self, query_vector: &[f32], k: usize) -> StoreResult<Vec<SearchResult>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let mut ranked: Vec<(usize, f32)> = self
            .vectors
            .similarities(query_vector)?
            .into_iter()
            .map(|score| if score.is_nan() { f32::NEG_INFINITY } else { score })
            .enumerate()
            .collect();

        // sort_by is stable
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|(index, similarity)| SearchResult {
                chunk: self.chunks[index].clone(),
                similarity,
            })
            .collect())
    }

    /// Embed `text` and search for it.
    pub fn query(
        &self,
        text: &str,
        embedder: &dyn EmbeddingGenerator,
        k: usize,
    ) -> StoreResult<Vec<SearchResult>> {
        if embedder.model_name() != self.manifest.model {
            tracing::warn!(
                target: "store",
                "querying with model '{}' but snapshot was built with '{}'",
                embedder.model_name(),
                self.manifest.model
            );
        }

        let vector = embedder.embed_one(text)?;
        self.search(&vector, k)
    }
}
