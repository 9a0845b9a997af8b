//! Prompt template types.

use serde::{Deserialize, Serialize};

/// Temperature used when a template does not set one.
pub const DEFAULT_TEMPERATURE: f32 = 0.0;

/// Output limit used when a template does not set one.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// A named prompt template loaded from the definition file.
///
/// The definition file is a mapping from template name to this structure:
///
/// ```yaml
/// base:
///   system: "You are a tax assistant..."
///   template: |
///     Context:
///     {{context}}
///
///     Question: {{question}}
///   temperature: 0.0
///   max_tokens: 2000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptTemplate {
    /// Template name (the mapping key)
    #[serde(skip)]
    pub name: String,

    /// System instruction text, placed before the body
    pub system: String,

    /// Body with Handlebars-style `{{placeholder}}` fields
    pub template: String,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum output length in tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl PromptTemplate {
    /// System instruction and body joined the way they are sent to the model.
    pub fn full_text(&self) -> String {
        if self.system.trim().is_empty() {
            self.template.clone()
        } else {
            format!("{}\n\n{}", self.system, self.template)
        }
    }

    /// Generation parameters with defaults applied.
    pub fn parameters(&self) -> GenerationParams {
        GenerationParams {
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        }
    }
}

/// Generation parameters attached to a template.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}
