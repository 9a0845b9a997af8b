//! Generation backend crate.
//!
//! A provider-agnostic `LlmClient` trait plus the Anthropic Claude
//! implementation used to answer questions.
//!
//! # Example
//! ```no_run
//! use taxrag_llm::{LlmClient, LlmRequest, providers::ClaudeClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ClaudeClient::new(std::env::var("ANTHROPIC_API_KEY")?);
//! let request = LlmRequest::new("What is VAT?", "claude-sonnet-4-20250514");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::ClaudeClient;
