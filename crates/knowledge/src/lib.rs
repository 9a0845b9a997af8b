//! Document knowledge base for the tax regulation assistant.
//!
//! Ingests PDF and text documents into page-attributed chunks, embeds them
//! into a SQLite-backed vector index and answers questions by retrieving the
//! most similar chunks and handing them to a generation backend.

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod parser;
pub mod rag;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use chunker::TextSplitter;
pub use embeddings::{create_provider, EmbeddingProvider};
pub use ingest::{documents_info, ingest};
pub use rag::{
    provision_index, AnswerResponse, QueryStage, RagService, ServiceState, ServiceStats,
    SourceCitation,
};
pub use types::{Chunk, DocumentsInfo, IndexInfo, PageNumber, RetrievalResult, ScoredChunk};
pub use vector_index::VectorIndex;
