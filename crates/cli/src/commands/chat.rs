//! Chat command handler.
//!
//! Line-oriented question loop over stdin. The conversation history is owned
//! here; the service itself is stateless between questions.

use clap::Args;
use std::io::Write;
use taxrag_core::{AppResult, Settings};
use taxrag_knowledge::{AnswerResponse, RagService};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::print_answer;

/// Interactive question loop (type `exit` to quit)
#[derive(Args, Debug)]
pub struct ChatCommand {}

impl ChatCommand {
    pub async fn execute(&self, settings: &Settings) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let mut service = RagService::from_settings(settings.clone())?;
        service.initialize().await?;

        let stats = service.stats();
        println!(
            "Tax assistant ready ({} chunks indexed, model {}).",
            stats.documents_in_db, stats.model
        );
        println!("Commands: 'history', 'clear', 'exit'.");

        let mut history: Vec<AnswerResponse> = Vec::new();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("> ");
            std::io::stdout().flush().ok();

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let question = line.trim();

            match question {
                "" => continue,
                "exit" | "quit" => break,
                "history" => {
                    print_history(&history);
                    continue;
                }
                "clear" => {
                    history.clear();
                    println!("History cleared.");
                    continue;
                }
                _ => {}
            }

            // A failed question is reported and the loop keeps going.
            match service.ask(question).await {
                Ok(response) => {
                    print_answer(&response);
                    history.push(response);
                }
                Err(e) => {
                    tracing::error!("Question failed: {}", e);
                    println!("Error: {}", e);
                }
            }
            println!();
        }

        tracing::info!("Chat ended after {} answered questions", history.len());
        Ok(())
    }
}

fn print_history(history: &[AnswerResponse]) {
    if history.is_empty() {
        println!("No questions asked yet.");
        return;
    }

    for (i, entry) in history.iter().enumerate() {
        println!("{}. Q: {}", i + 1, entry.question);
        println!("   A: {}", entry.answer.lines().next().unwrap_or_default());
    }
}
