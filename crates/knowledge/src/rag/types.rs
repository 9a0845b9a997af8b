//! Answer, citation and service status types.

use crate::types::{Chunk, PageNumber};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of characters of chunk text shown in a citation preview.
pub const PREVIEW_CHARS: usize = 200;

/// Where a piece of retrieved evidence came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    /// Source file name
    pub file: String,

    /// Page number, or "unknown"
    pub page: PageNumber,

    /// First characters of the chunk text
    pub content_preview: String,
}

impl SourceCitation {
    pub fn from_chunk(chunk: &Chunk) -> Self {
        Self {
            file: chunk.source_id.clone(),
            page: chunk.page,
            content_preview: preview(&chunk.text),
        }
    }
}

/// A generated answer with its cited sources, in retrieval order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourceCitation>,
}

/// Configuration and index size snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceStats {
    pub model: String,
    pub prompt_type: String,
    pub documents_in_db: usize,
    pub top_k: usize,
    pub chunk_size: usize,
}

/// Lifecycle state of the answering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceState {
    Uninitialized,
    Ready,
    /// Initialization failed; holds the error message
    Error(String),
}

/// Stage of a single query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStage {
    Retrieving,
    Generating,
    Completed,
}

impl QueryStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Retrieving => "retrieving",
            Self::Generating => "generating",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for QueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First `PREVIEW_CHARS` characters of the text.
fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
