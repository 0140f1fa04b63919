//! Command implementations for the CLI.
//!
//! Each command is implemented in its own module.

pub mod ask;
pub mod index;
pub mod init;
pub mod search;
pub mod status;

use anyhow::Context;

use crate::config::Settings;
use crate::store::VectorStore;
use crate::vector::FastEmbedGenerator;

/// Load the configured embedding model.
pub(crate) fn load_embedder(settings: &Settings) -> anyhow::Result<FastEmbedGenerator> {
    FastEmbedGenerator::from_settings(
        &settings.embedding.model,
        settings.embedding.cache_dir.clone(),
        settings.embedding.show_download_progress,
    )
    .with_context(|| {
        format!(
            "failed to load embedding model {}",
            settings.embedding.model
        )
    })
}

pub(crate) fn open_store(settings: &Settings) -> VectorStore {
    VectorStore::at_root(settings.store_root())
}
