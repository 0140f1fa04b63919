//! Loading documents from files and directories.
//!
//! PDFs go through `pdf-extract`; `.txt` and `.md` files are read as UTF-8.
//! Directories are walked recursively in file-name order.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use super::types::Document;

/// File extensions `load_documents` understands (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "md"];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Unsupported file type: {} (expected one of: pdf, txt, md)", .0.display())]
    Unsupported(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract text from {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },
}

/// Load every supported file under `paths`, in argument order.
///
/// Files named explicitly must have a supported extension; unsupported
/// files found inside directories are skipped.
pub fn load_documents<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Document>, LoadError> {
    let mut documents = Vec::new();

    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        if path.is_dir() {
            for file in collect_files(path)? {
                documents.push(load_document(&file)?);
            }
        } else {
            documents.push(load_document(path)?);
        }
    }

    tracing::info!(target: "loader", "loaded {} documents", documents.len());
    Ok(documents)
}

/// Load one file. The document source is the file name.
pub fn load_document(path: &Path) -> Result<Document, LoadError> {
    let extension = extension_of(path).ok_or_else(|| LoadError::Unsupported(path.to_path_buf()))?;

    let text = match extension.as_str() {
        "pdf" => extract_pdf_text(path)?,
        "txt" | "md" => fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?,
        _ => return Err(LoadError::Unsupported(path.to_path_buf())),
    };

    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let document = Document::new(source, text);
    if document.is_blank() {
        tracing::warn!(target: "loader", "{} has no extractable text", path.display());
    } else {
        tracing::debug!(
            target: "loader",
            "{}: {} chars",
            path.display(),
            document.char_count()
        );
    }

    Ok(document)
}

fn extension_of(path: &Path) -> Option<String> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS
        .contains(&extension.as_str())
        .then_some(extension)
}

fn collect_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| LoadError::Io {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if extension_of(entry.path()).is_some() {
            files.push(entry.into_path());
        } else {
            tracing::debug!(target: "loader", "skipping {}", entry.path().display());
        }
    }

    Ok(files)
}

fn extract_pdf_text(path: &Path) -> Result<String, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // pdf-extract panics on some malformed files
    let extraction = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(&bytes))
        .map_err(|_| LoadError::Extraction {
            path: path.to_path_buf(),
            reason: "PDF parser panicked".to_string(),
        })?;

    extraction.map_err(|e| LoadError::Extraction {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
