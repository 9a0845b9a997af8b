//! Stats command handler.

use clap::Args;
use taxrag_core::{AppResult, Settings};
use taxrag_knowledge::RagService;

use super::print_json;

/// Show the service configuration and index size
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let mut service = RagService::from_settings(settings.clone())?;
        service.initialize().await?;
        let stats = service.stats();

        if self.json {
            print_json(&stats)?;
        } else {
            println!("Model: {}", stats.model);
            println!("  Prompt type: {}", stats.prompt_type);
            println!("  Documents in index: {}", stats.documents_in_db);
            println!("  Top k: {}", stats.top_k);
            println!("  Chunk size: {}", stats.chunk_size);
        }

        Ok(())
    }
}
