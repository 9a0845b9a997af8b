//! Prompt templates for answer generation.
//!
//! Templates live in a single YAML file mapping names to a system
//! instruction, a Handlebars body and optional generation parameters.
//! Rendering is strict: an unbound placeholder is an error.

pub mod builder;
pub mod loader;
pub mod store;
pub mod types;

// Re-export main types
pub use builder::{placeholders, render_template};
pub use loader::{load_templates, parse_templates};
pub use store::PromptStore;
pub use types::{GenerationParams, PromptTemplate, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
