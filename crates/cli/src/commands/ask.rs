//! Ask command handler.
//!
//! Answers a single question from the indexed documents.

use clap::Args;
use taxrag_core::{AppError, AppResult, Settings};
use taxrag_knowledge::RagService;

use super::{print_answer, print_json};

/// Ask a single question about the indexed tax documents
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to answer
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Question: {}", self.question);

        if self.question.trim().is_empty() {
            return Err(AppError::Validation("Question cannot be empty".to_string()));
        }

        let mut service = RagService::from_settings(settings.clone())?;
        service.initialize().await?;

        let response = service.ask(&self.question).await?;

        if self.json {
            print_json(&response)?;
        } else {
            print_answer(&response);
        }

        Ok(())
    }
}
