//! Ingest command handler.
//!
//! Dry run of document ingestion: reports what would be indexed without
//! touching the vector index.

use clap::Args;
use std::path::PathBuf;
use taxrag_core::{AppResult, Settings};
use taxrag_knowledge::{documents_info, ingest, TextSplitter};

use super::print_json;

/// Show the documents and chunk count that a build would index
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Documents directory (default: the configured documents directory)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        let dir = self.dir.as_ref().unwrap_or(&settings.documents_dir);
        let info = documents_info(dir)?;

        let splitter = TextSplitter::new(settings.chunk_size, settings.chunk_overlap)?;
        let chunks = ingest(dir, &splitter)?;

        if self.json {
            let output = serde_json::json!({
                "directory": dir,
                "documents": info,
                "chunks": chunks.len(),
                "chunkSize": splitter.chunk_size(),
                "chunkOverlap": splitter.chunk_overlap(),
            });
            print_json(&output)?;
        } else {
            println!("Documents directory: {}", dir.display());
            println!("  Files: {}", info.count);
            for file in &info.files {
                println!("    - {}", file);
            }
            println!("  Total size: {} bytes", info.total_size_bytes);
            println!(
                "  Chunks: {} (size {}, overlap {})",
                chunks.len(),
                splitter.chunk_size(),
                splitter.chunk_overlap()
            );
        }

        Ok(())
    }
}
