//! Command handlers for the taxrag CLI.

pub mod ask;
pub mod build;
pub mod chat;
pub mod ingest;
pub mod prompts;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use build::BuildCommand;
pub use chat::ChatCommand;
pub use ingest::IngestCommand;
pub use prompts::PromptsCommand;
pub use stats::StatsCommand;

use taxrag_core::{AppError, AppResult};
use taxrag_knowledge::rag::PREVIEW_CHARS;
use taxrag_knowledge::AnswerResponse;

/// Serialize a value as pretty JSON on stdout.
pub(crate) fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> AppResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

/// Print an answer followed by its numbered sources.
pub(crate) fn print_answer(response: &AnswerResponse) {
    println!("{}", response.answer);
    println!();

    if response.sources.is_empty() {
        println!("Sources: (no sources available)");
        return;
    }

    println!("Sources:");
    for (i, source) in response.sources.iter().enumerate() {
        println!("{}. {} (page {})", i + 1, source.file, source.page);
        let ellipsis = if source.content_preview.chars().count() >= PREVIEW_CHARS {
            "..."
        } else {
            ""
        };
        println!(
            "   {}{}",
            source.content_preview.replace('\n', " "),
            ellipsis
        );
    }
}
