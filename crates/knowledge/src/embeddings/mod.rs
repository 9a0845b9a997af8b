//! Embedding providers and vector similarity.
//!
//! A provider is constructed once from [`EmbeddingConfig`] and shared by index
//! build and search, so chunks and queries are always embedded the same way.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use taxrag_core::EmbeddingConfig;

/// Cosine similarity between two vectors, in [-1, 1].
///
/// Vectors of different length or with zero norm score 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
