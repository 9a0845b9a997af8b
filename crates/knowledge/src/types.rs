//! Core types for ingestion, indexing and retrieval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Page provenance of a chunk.
///
/// PDF pages are numbered from 1. Formats without pages carry `Unknown`,
/// which serializes as the string `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageNumber {
    Number(u32),
    Unknown,
}

impl PageNumber {
    /// Numeric page, if known.
    pub fn as_number(&self) -> Option<u32> {
        match self {
            PageNumber::Number(n) => Some(*n),
            PageNumber::Unknown => None,
        }
    }
}

impl From<Option<u32>> for PageNumber {
    fn from(value: Option<u32>) -> Self {
        value.map(PageNumber::Number).unwrap_or(PageNumber::Unknown)
    }
}

impl fmt::Display for PageNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageNumber::Number(n) => write!(f, "{}", n),
            PageNumber::Unknown => write!(f, "unknown"),
        }
    }
}

impl Serialize for PageNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PageNumber::Number(n) => serializer.serialize_u32(*n),
            PageNumber::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for PageNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u32),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(PageNumber::Number(n)),
            Raw::Text(s) if s == "unknown" => Ok(PageNumber::Unknown),
            Raw::Text(s) => Err(serde::de::Error::custom(format!(
                "invalid page number: {}",
                s
            ))),
        }
    }
}

/// Text of one logical page of a source document.
#[derive(Debug, Clone, PartialEq)]
pub struct PageText {
    pub page: PageNumber,
    pub text: String,
}

/// A bounded span of source text, the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text (never empty)
    pub text: String,

    /// Originating file name
    pub source_id: String,

    /// Page the text was taken from
    pub page: PageNumber,
}

/// A retrieved chunk with its relevance score.
///
/// The score is the cosine similarity between query and chunk embeddings,
/// in [-1, 1], higher meaning more relevant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Chunks for a single query, ordered by descending relevance.
pub type RetrievalResult = Vec<ScoredChunk>;

/// Introspection data for a persisted collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexInfo {
    pub exists: bool,
    pub count: usize,
    pub collection_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub built_at: Option<DateTime<Utc>>,
}

/// Summary of the documents available for ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocumentsInfo {
    pub count: usize,
    pub files: Vec<String>,
    pub total_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_number_serialization() {
        assert_eq!(serde_json::to_string(&PageNumber::Number(3)).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&PageNumber::Unknown).unwrap(),
            "\"unknown\""
        );

        let page: PageNumber = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(page, PageNumber::Unknown);
        let page: PageNumber = serde_json::from_str("12").unwrap();
        assert_eq!(page, PageNumber::Number(12));
        assert!(serde_json::from_str::<PageNumber>("\"twelve\"").is_err());
    }

    #[test]
    fn test_page_number_display_and_option() {
        assert_eq!(PageNumber::Number(7).to_string(), "7");
        assert_eq!(PageNumber::Unknown.to_string(), "unknown");
        assert_eq!(PageNumber::from(None), PageNumber::Unknown);
        assert_eq!(PageNumber::from(Some(2)).as_number(), Some(2));
    }

    #[test]
    fn test_chunk_json_shape() {
        let chunk = Chunk {
            text: "Standard rate is 20%.".to_string(),
            source_id: "vat_law.pdf".to_string(),
            page: PageNumber::Number(3),
        };

        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["source_id"], "vat_law.pdf");
        assert_eq!(json["page"], 3);
    }
}
