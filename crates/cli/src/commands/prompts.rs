//! Prompts command handler.

use clap::Args;
use taxrag_core::{AppResult, Settings};
use taxrag_prompt::PromptStore;

/// List the available prompt templates
#[derive(Args, Debug)]
pub struct PromptsCommand {}

impl PromptsCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        tracing::info!("Executing prompts command");

        let store = PromptStore::load(&settings.prompts_file)?;

        for name in store.names() {
            let params = store.parameters(&name)?;
            let marker = if name == settings.prompt_type { "*" } else { " " };
            println!(
                "{} {} (temperature {}, max_tokens {})",
                marker, name, params.temperature, params.max_tokens
            );
        }

        Ok(())
    }
}
