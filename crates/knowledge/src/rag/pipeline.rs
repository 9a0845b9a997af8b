//! Typed stages between retrieval and generation.

use crate::rag::types::SourceCitation;
use crate::types::ScoredChunk;
use std::collections::HashMap;

/// Format retrieved chunks as numbered context blocks, in retrieval order.
///
/// Each block reads `[Document i: <source>, p. <page>]` followed by the chunk text.
pub fn format_context(results: &[ScoredChunk]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, scored)| {
            format!(
                "[Document {}: {}, p. {}]\n{}",
                i + 1,
                scored.chunk.source_id,
                scored.chunk.page,
                scored.chunk.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Variables bound into the answer template.
pub fn prompt_variables(context: &str, question: &str) -> HashMap<String, String> {
    HashMap::from([
        ("context".to_string(), context.to_string()),
        ("question".to_string(), question.to_string()),
    ])
}

/// Citations for the retrieved chunks, same order as retrieval.
pub fn cite_sources(results: &[ScoredChunk]) -> Vec<SourceCitation> {
    results
        .iter()
        .map(|scored| SourceCitation::from_chunk(&scored.chunk))
        .collect()
}
