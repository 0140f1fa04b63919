//! Generation-swapped vector store.
//!
//! Layout under `<working_dir>/doc_vectorstore/`:
//! - `CURRENT` names the live generation
//! - `snapshot-NNNNNN/` published generations (immutable)
//! - `.staging-*` generation being written
//! - `.rebuild.lock` held while a rebuild runs
//!
//! A rebuild embeds everything first, writes a staging directory, renames it
//! to the next generation and then replaces `CURRENT` atomically. Readers
//! never observe a partial snapshot.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;

use super::error::{StoreError, StoreResult};
use super::lock::RebuildLock;
use super::snapshot::{
    CHUNKS_FILE, CURRENT_FILE, MANIFEST_FILE, Manifest, SNAPSHOT_FORMAT_VERSION, SearchResult,
    Snapshot, VECTORS_FILE, generation_dir_name, parse_generation, read_current,
};
use crate::documents::Chunk;
use crate::utils::{calculate_hash, get_utc_timestamp};
use crate::vector::{EmbeddingError, EmbeddingGenerator, VectorDimension, write_vectors};

/// Directory name of the store inside the working directory.
pub const VECTOR_STORE_DIR: &str = "doc_vectorstore";

/// Default number of chunks embedded per provider call.
pub const EMBEDDING_BATCH_SIZE: usize = 64;

const STAGING_PREFIX: &str = ".staging-";

/// Progress events emitted during a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexProgress {
    GeneratingEmbeddings { current: usize, total: usize },
}

/// Summary of a completed rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct RebuildStats {
    pub generation: u64,
    pub chunk_count: usize,
    pub document_count: usize,
    pub dimension: VectorDimension,
    pub elapsed: Duration,
}

/// Persistent store of chunk embeddings.
#[derive(Debug, Clone)]
pub struct VectorStore {
    root: PathBuf,
}

impl VectorStore {
    /// Store located at `working_dir/doc_vectorstore`. Nothing is touched on disk.
    pub fn open(working_dir: impl AsRef<Path>) -> Self {
        Self::at_root(working_dir.as_ref().join(VECTOR_STORE_DIR))
    }

    /// Store rooted directly at `root`.
    pub fn at_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// True once a rebuild has published a snapshot.
    pub fn exists(&self) -> bool {
        matches!(read_current(&self.root), Ok(Some(_)))
    }

    /// Open the live snapshot.
    pub fn snapshot(&self) -> StoreResult<Snapshot> {
        self.with_current(Snapshot::open_dir)
    }

    /// Manifest of the live snapshot without loading chunks or vectors.
    pub fn manifest(&self) -> StoreResult<Manifest> {
        self.with_current(Manifest::read)
    }

    /// Embed `text` and return the `k` nearest chunks.
    pub fn query(
        &self,
        text: &str,
        embedder: &dyn EmbeddingGenerator,
        k: usize,
    ) -> StoreResult<Vec<SearchResult>> {
        self.snapshot()?.query(text, embedder, k)
    }

    /// Replace the store contents with `chunks`.
    pub fn rebuild(
        &self,
        chunks: &[Chunk],
        embedder: &dyn EmbeddingGenerator,
    ) -> StoreResult<RebuildStats> {
        self.rebuild_with_progress(chunks, embedder, EMBEDDING_BATCH_SIZE, |_| {})
    }

    /// Replace the store contents with `chunks`, reporting embedding progress.
    ///
    /// On error nothing is published and the previous snapshot stays live.
    pub fn rebuild_with_progress<F>(
        &self,
        chunks: &[Chunk],
        embedder: &dyn EmbeddingGenerator,
        batch_size: usize,
        mut on_progress: F,
    ) -> StoreResult<RebuildStats>
    where
        F: FnMut(IndexProgress),
    {
        let start = Instant::now();
        fs::create_dir_all(&self.root)?;
        let _lock = RebuildLock::acquire(&self.root)?;

        let dimension = embedder.dimension();
        let vectors = embed_all(chunks, embedder, batch_size.max(1), &mut on_progress)?;

        let previous = read_current(&self.root)?;
        let generation = self.next_generation()?;
        let name = generation_dir_name(generation);

        let sources = distinct_sources(chunks);
        let chunk_bytes = serde_json::to_vec(chunks)?;
        let manifest = Manifest {
            format_version: SNAPSHOT_FORMAT_VERSION,
            generation,
            model: embedder.model_name().to_string(),
            dimension: dimension.get(),
            chunk_count: chunks.len(),
            document_count: sources.len(),
            sources,
            created_at: get_utc_timestamp(),
            chunks_sha256: calculate_hash(&chunk_bytes),
        };

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)?;
        write_synced(&staging.path().join(CHUNKS_FILE), &chunk_bytes)?;
        write_vectors(&staging.path().join(VECTORS_FILE), dimension, &vectors)?;
        write_synced(
            &staging.path().join(MANIFEST_FILE),
            &serde_json::to_vec_pretty(&manifest)?,
        )?;
        sync_dir(staging.path());

        let generation_dir = self.root.join(&name);
        fs::rename(staging.path(), &generation_dir)?;
        // Renamed away; nothing left for TempDir to clean up
        let _ = staging.keep();
        sync_dir(&self.root);

        self.publish(&name)?;

        tracing::info!(
            target: "store",
            "published {name}: {} chunks from {} documents",
            manifest.chunk_count,
            manifest.document_count
        );

        self.prune(&name, previous.as_deref());

        Ok(RebuildStats {
            generation,
            chunk_count: manifest.chunk_count,
            document_count: manifest.document_count,
            dimension,
            elapsed: start.elapsed(),
        })
    }

    /// Resolve `CURRENT` and run `open` on the generation it names.
    ///
    /// A rebuild may prune the generation between reading `CURRENT` and
    /// opening it; in that case `CURRENT` is read once more.
    fn with_current<T>(&self, open: impl Fn(&Path) -> StoreResult<T>) -> StoreResult<T> {
        let name = self.current_name()?;
        match open(&self.root.join(&name)) {
            Err(StoreError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                let retry = self.current_name()?;
                tracing::debug!(target: "store", "{name} vanished, retrying with {retry}");
                open(&self.root.join(retry))
            }
            other => other,
        }
    }

    fn current_name(&self) -> StoreResult<String> {
        read_current(&self.root)?.ok_or_else(|| StoreError::StoreNotInitialized(self.root.clone()))
    }

    fn generation_names(&self) -> StoreResult<Vec<(u64, String)>> {
        let mut generations = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if let Some(generation) = parse_generation(&name) {
                generations.push((generation, name));
            }
        }
        generations.sort();
        Ok(generations)
    }

    fn next_generation(&self) -> StoreResult<u64> {
        Ok(self
            .generation_names()?
            .last()
            .map_or(1, |(generation, _)| generation + 1))
    }

    /// Atomically point `CURRENT` at `name`.
    fn publish(&self, name: &str) -> StoreResult<()> {
        let mut temp = NamedTempFile::new_in(&self.root)?;
        writeln!(temp, "{name}")?;
        temp.as_file().sync_all()?;
        temp.persist(self.root.join(CURRENT_FILE))
            .map_err(|e| StoreError::Io(e.error))?;
        sync_dir(&self.root);
        Ok(())
    }

    /// Remove generations other than `current` and `previous`, and stale
    /// staging directories. Best effort.
    fn prune(&self, current: &str, previous: Option<&str>) {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!(target: "store", "cannot list {}: {e}", self.root.display());
                return;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().into_owned();
            let stale = name.starts_with(STAGING_PREFIX)
                || (parse_generation(&name).is_some()
                    && name != current
                    && Some(name.as_str()) != previous);
            if !stale {
                continue;
            }

            match fs::remove_dir_all(entry.path()) {
                Ok(()) => tracing::debug!(target: "store", "pruned {name}"),
                Err(e) => tracing::warn!(target: "store", "failed to prune {name}: {e}"),
            }
        }
    }
}

fn embed_all<F>(
    chunks: &[Chunk],
    embedder: &dyn EmbeddingGenerator,
    batch_size: usize,
    on_progress: &mut F,
) -> StoreResult<Vec<Vec<f32>>>
where
    F: FnMut(IndexProgress),
{
    let total = chunks.len();
    let dimension = embedder.dimension();
    let mut vectors = Vec::with_capacity(total);

    for batch in chunks.chunks(batch_size) {
        let texts: Vec<&str> = batch.iter().map(|c| c.content.as_str()).collect();
        let embeddings = embedder.generate_embeddings(&texts)?;

        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            }
            .into());
        }
        for embedding in &embeddings {
            dimension
                .validate_vector(embedding)
                .map_err(EmbeddingError::from)?;
        }

        vectors.extend(embeddings);
        on_progress(IndexProgress::GeneratingEmbeddings {
            current: vectors.len(),
            total,
        });
    }

    tracing::debug!(target: "store", "embedded {total} chunks");
    Ok(vectors)
}

fn distinct_sources(chunks: &[Chunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .filter(|c| seen.insert(c.source.as_str()))
        .map(|c| c.source.clone())
        .collect()
}

fn write_synced(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

/// Flush directory entries. Not supported everywhere, so failures are ignored.
fn sync_dir(path: &Path) {
    if let Ok(dir) = File::open(path) {
        let _ = dir.sync_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::VectorError;
    use crate::vector::testing::KeywordEmbedder;
    use tempfile::TempDir;

    fn chunk(source: &str, index: usize, content: &str) -> Chunk {
        Chunk::new(source, index, (0, content.len()), content)
    }

    fn sample_chunks() -> Vec<Chunk> {
        vec![
            chunk("rust.pdf", 0, "Rust guarantees memory safety without garbage collection"),
            chunk("rust.pdf", 1, "Cargo is the Rust package manager and build tool"),
            chunk("cooking.pdf", 0, "Knead the dough and let it rise for two hours"),
        ]
    }

    #[test]
    fn test_query_before_rebuild_is_not_initialized() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        let embedder = KeywordEmbedder::new(32);

        assert!(!store.exists());
        assert!(matches!(
            store.query("anything", &embedder, 4),
            Err(StoreError::StoreNotInitialized(_))
        ));
        assert!(matches!(
            store.manifest(),
            Err(StoreError::StoreNotInitialized(_))
        ));
    }

    #[test]
    fn test_store_location() {
        let store = VectorStore::open("/work");
        assert_eq!(store.root(), Path::new("/work/doc_vectorstore"));
    }

    #[test]
    fn test_empty_rebuild_answers_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        let embedder = KeywordEmbedder::new(32);

        let stats = store.rebuild(&[], &embedder).unwrap();
        assert_eq!(stats.chunk_count, 0);
        assert!(store.exists());

        let results = store.query("anything", &embedder, 4).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_exact_chunk_text_ranks_first() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        let embedder = KeywordEmbedder::new(256);
        let chunks = sample_chunks();

        store.rebuild(&chunks, &embedder).unwrap();

        let results = store.query(&chunks[2].content, &embedder, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk, chunks[2]);
        assert!((results[0].similarity - 1.0).abs() < 1e-5);
        assert!(results[0].similarity >= results[1].similarity);
    }

    #[test]
    fn test_fewer_chunks_than_k_returns_all() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        let embedder = KeywordEmbedder::new(256);

        store.rebuild(&sample_chunks(), &embedder).unwrap();
        let results = store.query("rust", &embedder, 10).unwrap();
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn test_ties_keep_snapshot_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        let embedder = KeywordEmbedder::new(256);
        let chunks = vec![
            chunk("a.txt", 0, "same words here"),
            chunk("b.txt", 0, "same words here"),
            chunk("c.txt", 0, "same words here"),
        ];

        store.rebuild(&chunks, &embedder).unwrap();
        let results = store.query("same words here", &embedder, 3).unwrap();
        let sources: Vec<_> = results.iter().map(|r| r.chunk.source.as_str()).collect();
        assert_eq!(sources, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_rebuild_overwrites_previous_contents() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        let embedder = KeywordEmbedder::new(256);

        store.rebuild(&sample_chunks(), &embedder).unwrap();
        let replacement = vec![chunk("ocean.pdf", 0, "Whales migrate across the ocean")];
        let stats = store.rebuild(&replacement, &embedder).unwrap();
        assert_eq!(stats.generation, 2);

        let results = store.query("Rust memory safety", &embedder, 4).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.source, "ocean.pdf");

        let manifest = store.manifest().unwrap();
        assert_eq!(manifest.sources, vec!["ocean.pdf".to_string()]);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        let embedder = KeywordEmbedder::new(256);
        let chunks = sample_chunks();

        store.rebuild(&chunks, &embedder).unwrap();
        let first = store.query("Rust package manager", &embedder, 3).unwrap();
        store.rebuild(&chunks, &embedder).unwrap();
        let second = store.query("Rust package manager", &embedder, 3).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());

        store
            .rebuild(&sample_chunks(), &KeywordEmbedder::new(256))
            .unwrap();

        let failing = KeywordEmbedder::failing_on(256, "poison");
        let bad = vec![
            chunk("new.pdf", 0, "fine text"),
            chunk("new.pdf", 1, "poison pill"),
        ];
        let result = store.rebuild(&bad, &failing);
        assert!(matches!(result, Err(StoreError::EmbeddingFailure(_))));

        let manifest = store.manifest().unwrap();
        assert_eq!(manifest.generation, 1);
        assert_eq!(manifest.chunk_count, 3);
        assert!(RebuildLock::acquire(store.root()).is_ok());

        let results = store
            .query("garbage collection", &KeywordEmbedder::new(256), 1)
            .unwrap();
        assert_eq!(results[0].chunk.source, "rust.pdf");
    }

    #[test]
    fn test_concurrent_rebuild_fails_fast() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        fs::create_dir_all(store.root()).unwrap();

        let _held = RebuildLock::acquire(store.root()).unwrap();
        let result = store.rebuild(&sample_chunks(), &KeywordEmbedder::new(256));
        assert!(matches!(result, Err(StoreError::RebuildInProgress(_))));
        assert!(!store.exists());
    }

    #[test]
    fn test_rebuild_after_killed_rebuild() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        fs::create_dir_all(store.root()).unwrap();
        // A rebuild killed mid-run leaves its lock file and a staging dir
        fs::write(store.root().join(".rebuild.lock"), "4194304\n").unwrap();
        fs::create_dir(store.root().join(".staging-crashed")).unwrap();

        let stats = store
            .rebuild(&sample_chunks(), &KeywordEmbedder::new(256))
            .unwrap();
        assert_eq!(stats.generation, 1);
        assert_eq!(stats.chunk_count, 3);
        assert!(!store.root().join(".staging-crashed").exists());
    }

    #[test]
    fn test_progress_reports_batches() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        let mut events = Vec::new();

        store
            .rebuild_with_progress(&sample_chunks(), &KeywordEmbedder::new(16), 2, |p| {
                events.push(p)
            })
            .unwrap();

        assert_eq!(
            events,
            vec![
                IndexProgress::GeneratingEmbeddings { current: 2, total: 3 },
                IndexProgress::GeneratingEmbeddings { current: 3, total: 3 },
            ]
        );
    }

    #[test]
    fn test_old_generations_are_pruned() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        let embedder = KeywordEmbedder::new(16);

        for _ in 0..3 {
            store.rebuild(&sample_chunks(), &embedder).unwrap();
        }

        assert!(!store.root().join("snapshot-000001").exists());
        assert!(store.root().join("snapshot-000002").exists());
        assert!(store.root().join("snapshot-000003").exists());
    }

    #[test]
    fn test_tampered_chunks_are_detected() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());
        let embedder = KeywordEmbedder::new(16);

        store.rebuild(&sample_chunks(), &embedder).unwrap();
        let chunks_path = store.root().join("snapshot-000001").join(CHUNKS_FILE);
        fs::write(&chunks_path, "[]").unwrap();

        assert!(matches!(store.snapshot(), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_query_with_wrong_dimension_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = VectorStore::open(temp_dir.path());

        store
            .rebuild(&sample_chunks(), &KeywordEmbedder::new(16))
            .unwrap();
        let result = store.query("rust", &KeywordEmbedder::new(8), 2);
        assert!(matches!(
            result,
            Err(StoreError::Vector(VectorError::DimensionMismatch {
                expected: 16,
                actual: 8
            }))
        ));
    }
}
