//! Build command handler.
//!
//! Explicit administrative (re)build of the vector index.

use clap::Args;
use taxrag_core::{AppResult, Settings};
use taxrag_knowledge::{create_provider, provision_index};

use super::print_json;

/// Ingest the documents directory and build the vector index
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Delete and replace an existing collection
    #[arg(long)]
    pub force: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl BuildCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        tracing::info!("Executing build command");

        settings.validate()?;
        settings.ensure_dirs()?;

        let embedder = create_provider(&settings.embedding)?;
        let index = provision_index(settings, embedder, self.force).await?;
        let info = index.info();

        if self.json {
            print_json(&info)?;
        } else {
            println!(
                "Built collection '{}' with {} chunks",
                info.collection_id, info.count
            );
            println!("  Location: {}", index.db_dir().display());
            if let Some(model) = &info.embedding_model {
                println!("  Embedding model: {}", model);
            }
        }

        Ok(())
    }
}
