//! Search command.

use std::process::ExitCode;

use anyhow::Context;

use super::{load_embedder, open_store};
use crate::config::Settings;

const PREVIEW_CHARS: usize = 240;

/// Run search command - print the nearest chunks for a query.
pub fn run(query: &str, top_k: Option<usize>, json: bool, settings: &Settings) -> anyhow::Result<ExitCode> {
    let store = open_store(settings);
    let snapshot = store.snapshot().context("cannot open the vector store")?;
    let embedder = load_embedder(settings)?;

    let k = top_k.unwrap_or(settings.retrieval.top_k).max(1);
    let results = snapshot
        .query(query, &embedder, k)
        .with_context(|| format!("search for '{query}' failed"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        eprintln!("No results found.");
    } else {
        for (i, result) in results.iter().enumerate() {
            println!(
                "\n{}. {} #{} (score: {:.3})",
                i + 1,
                result.chunk.source,
                result.chunk.chunk_index,
                result.similarity
            );
            println!("   Preview: {}", result.chunk.preview(PREVIEW_CHARS).replace('\n', " "));
        }
    }

    Ok(ExitCode::SUCCESS)
}
