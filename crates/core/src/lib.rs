//! Tax RAG Core Library
//!
//! Foundational utilities shared by every crate in the workspace:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Settings management

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{EmbeddingConfig, Settings};
pub use error::{AppError, AppResult};
