//! Document discovery and ingestion.

use crate::chunker::TextSplitter;
use crate::parser::{self, DocumentKind};
use crate::types::{Chunk, DocumentsInfo};
use std::path::{Path, PathBuf};
use taxrag_core::{AppError, AppResult};
use walkdir::WalkDir;

/// Ingest every supported document under `dir` into chunks.
///
/// Files are visited in path order so the chunk sequence is deterministic.
/// Files that cannot be read or parsed are skipped with a warning. An empty
/// directory yields an empty vector; whether that is fatal is up to the caller.
///
/// # Errors
/// Returns `AppError::NotFound` if `dir` does not exist.
pub fn ingest(dir: &Path, splitter: &TextSplitter) -> AppResult<Vec<Chunk>> {
    let files = discover_documents(dir)?;

    tracing::info!("Ingesting {} documents from {:?}", files.len(), dir);

    let mut chunks = Vec::new();
    let mut skipped = 0usize;

    for path in &files {
        let pages = match parser::extract_pages(path) {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                skipped += 1;
                continue;
            }
        };

        let source_id = source_name(path);
        chunks.extend(splitter.chunk_pages(&source_id, &pages)?);
    }

    if files.is_empty() {
        tracing::warn!("No supported documents found in {:?}", dir);
    }

    tracing::info!(
        "Ingestion produced {} chunks from {} documents ({} skipped)",
        chunks.len(),
        files.len() - skipped,
        skipped
    );

    Ok(chunks)
}

/// Supported document files under `dir`, recursively, sorted by path.
pub fn discover_documents(dir: &Path) -> AppResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AppError::NotFound(format!(
            "Documents directory not found: {}",
            dir.display()
        )));
    }

    let files = WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| DocumentKind::from_path(path).is_some())
        .collect();

    Ok(files)
}

/// Summary of the documents under `dir`. A missing directory reports zero documents.
pub fn documents_info(dir: &Path) -> AppResult<DocumentsInfo> {
    if !dir.exists() {
        return Ok(DocumentsInfo::default());
    }

    let files = discover_documents(dir)?;
    let mut total_size_bytes = 0u64;
    for path in &files {
        total_size_bytes += std::fs::metadata(path)?.len();
    }

    Ok(DocumentsInfo {
        count: files.len(),
        files: files.iter().map(|p| source_name(p)).collect(),
        total_size_bytes,
    })
}

/// File name used as the chunk source, with directories stripped.
fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
