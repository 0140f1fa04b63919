//! Status command.

use std::process::ExitCode;

use anyhow::Context;

use super::open_store;
use crate::config::Settings;

/// Run status command - describe the live snapshot.
pub fn run(json: bool, settings: &Settings) -> anyhow::Result<ExitCode> {
    let store = open_store(settings);
    let manifest = store.manifest().context("cannot read the vector store")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
        return Ok(ExitCode::SUCCESS);
    }

    let created = chrono::DateTime::from_timestamp(manifest.created_at as i64, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| manifest.created_at.to_string());

    println!("Store:      {}", store.root().display());
    println!("Generation: {}", manifest.generation);
    println!("Created:    {created}");
    println!("Model:      {} ({} dimensions)", manifest.model, manifest.dimension);
    println!("Chunks:     {}", manifest.chunk_count);
    println!("Documents:  {}", manifest.document_count);
    for source in &manifest.sources {
        println!("  - {source}");
    }

    Ok(ExitCode::SUCCESS)
}
