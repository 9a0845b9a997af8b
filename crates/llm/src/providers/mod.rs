//! Generation backend implementations.

pub mod claude;

pub use claude::ClaudeClient;
