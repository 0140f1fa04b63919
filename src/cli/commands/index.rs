//! Index command.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};

use super::{load_embedder, open_store};
use crate::config::Settings;
use crate::documents::load_documents;
use crate::indexing::index_documents;
use crate::store::IndexProgress;

fn embedding_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.cyan} Embedding [{bar:40.cyan/blue}] {pos}/{len} chunks ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Run index command - load, chunk and embed documents, then publish a new snapshot.
pub fn run(paths: &[PathBuf], settings: &Settings, show_progress: bool) -> anyhow::Result<ExitCode> {
    let documents = load_documents(paths).context("failed to load documents")?;
    let embedder = load_embedder(settings)?;
    let store = open_store(settings);

    tracing::info!(target: "cli", "indexing {} paths into {}", paths.len(), store.root().display());

    let bar = show_progress.then(embedding_bar);
    let report = index_documents(
        &documents,
        &settings.chunking,
        &store,
        &embedder,
        settings.embedding.batch_size,
        |progress| {
            if let Some(bar) = &bar {
                let IndexProgress::GeneratingEmbeddings { current, total } = progress;
                bar.set_length(total as u64);
                bar.set_position(current as u64);
            }
        },
    );
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }
    let report = report.with_context(|| format!("failed to index into {}", store.root().display()))?;

    println!(
        "Indexed {} documents into {} chunks in {:.1}s",
        report.documents,
        report.chunks,
        report.stats.elapsed.as_secs_f64()
    );
    if report.blank_documents > 0 {
        println!(
            "{} documents had no extractable text",
            report.blank_documents
        );
    }
    println!(
        "Snapshot generation {} at {}",
        report.stats.generation,
        store.root().display()
    );

    Ok(ExitCode::SUCCESS)
}
