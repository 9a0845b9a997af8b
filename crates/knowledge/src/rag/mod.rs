//! Retrieval-augmented answering over the indexed documents.

pub mod pipeline;
pub mod service;
pub mod types;

pub use service::{provision_index, RagService};
pub use types::{
    AnswerResponse, QueryStage, ServiceState, ServiceStats, SourceCitation, PREVIEW_CHARS,
};
