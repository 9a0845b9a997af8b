//! Error types for the tax regulation RAG assistant.
//!
//! A single error enum covers every failure category of the pipeline:
//! configuration, missing resources, validation, parsing, the generation
//! backend and index storage.

use thiserror::Error;

/// Unified error type for the RAG assistant.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing credential or invalid/missing setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing directory, persisted index, template or prompt name
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected before any work was done
    #[error("Validation error: {0}")]
    Validation(String),

    /// A template placeholder had no bound variable
    #[error("Missing variable: '{name}'")]
    MissingVariable { name: String },

    /// Malformed definition or document file
    #[error("Parse error: {0}")]
    Parse(String),

    /// Generation backend call failed or returned an error status
    #[error("Backend error: {0}")]
    Backend(String),

    /// Persisted index failures
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Failure of one named pipeline stage
    #[error("{stage} failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    /// Wrap this error with the name of the pipeline stage that produced it.
    pub fn in_stage(self, stage: &'static str) -> Self {
        AppError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Return the innermost error, looking through stage wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_variable_names_placeholder() {
        let err = AppError::MissingVariable {
            name: "context".to_string(),
        };
        assert_eq!(err.to_string(), "Missing variable: 'context'");
    }

    #[test]
    fn test_stage_wrapping() {
        let err = AppError::Backend("status 529".to_string()).in_stage("generation");
        assert!(err.to_string().starts_with("generation failed"));
        assert!(matches!(err.root(), AppError::Backend(_)));
    }
}
