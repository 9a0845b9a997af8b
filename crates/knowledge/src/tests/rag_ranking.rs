//! Tests for retrieval ranking and end-to-end citation correctness.

use crate::embeddings::EmbeddingProvider;
use crate::types::{Chunk, PageNumber};
use crate::vector_index::VectorIndex;
use std::collections::HashMap;
use std::sync::Arc;
use taxrag_core::{AppError, AppResult};
use tempfile::TempDir;

/// Embeds known texts to fixed vectors and everything else to the zero vector.
#[derive(Debug)]
struct FixedProvider {
    vectors: HashMap<String, Vec<f32>>,
    dimensions: usize,
}

impl FixedProvider {
    fn new(pairs: &[(&str, Vec<f32>)]) -> Arc<Self> {
        let dimensions = pairs.first().map(|(_, v)| v.len()).unwrap_or(3);
        Arc::new(Self {
            vectors: pairs
                .iter()
                .map(|(text, v)| (text.to_string(), v.clone()))
                .collect(),
            dimensions,
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FixedProvider {
    fn provider_name(&self) -> &str {
        "fixed"
    }

    fn model_name(&self) -> &str {
        "fixed-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                self.vectors
                    .get(t)
                    .cloned()
                    .unwrap_or_else(|| vec![0.0; self.dimensions])
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            source_id: "tax_code.pdf".to_string(),
            page: PageNumber::Number(1),
        }
    }

    async fn build(provider: Arc<FixedProvider>, texts: &[&str]) -> (TempDir, VectorIndex) {
        let temp = TempDir::new().unwrap();
        let chunks = texts.iter().map(|t| chunk(t)).collect();
        let index = VectorIndex::build(temp.path(), chunks, "tax", false, provider)
            .await
            .unwrap();
        (temp, index)
    }

    #[tokio::test]
    async fn test_scores_are_ordered_descending() {
        let provider = FixedProvider::new(&[
            ("query", vec![1.0, 0.0, 0.0]),
            ("Text A", vec![0.0, 1.0, 0.0]),
            ("Text B", vec![0.7, 0.7, 0.0]),
            ("Text C", vec![1.0, 0.0, 0.0]),
            ("Text D", vec![-1.0, 0.0, 0.0]),
        ]);
        let (_temp, index) = build(provider, &["Text A", "Text B", "Text C", "Text D"]).await;

        let results = index.search("query", 10).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["Text C", "Text B", "Text A", "Text D"]);

        assert!(results[0].score > 0.99, "Perfect match should score near 1.0");
        assert!(
            results[3].score < -0.9,
            "Opposite vectors should score near -1.0: {}",
            results[3].score
        );
    }

    #[tokio::test]
    async fn test_unrelated_query_returns_low_scores() {
        let provider = FixedProvider::new(&[
            ("pasta recipes", vec![0.0, 1.0, 0.0]),
            ("Customs valuation rules", vec![1.0, 0.0, 0.0]),
        ]);
        let (_temp, index) = build(provider, &["Customs valuation rules"]).await;

        let results = index.search("pasta recipes", 3).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].score.abs() < 0.01);
    }

    #[tokio::test]
    async fn test_top_k_limit_respected() {
        let mut pairs = vec![("query", vec![1.0, 0.0, 0.0])];
        let texts: Vec<String> = (0..10).map(|i| format!("Article {}", i)).collect();
        for (i, text) in texts.iter().enumerate() {
            pairs.push((text.as_str(), vec![i as f32 / 10.0, 1.0, 0.0]));
        }
        let provider = FixedProvider::new(&pairs);
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let (_temp, index) = build(provider, &refs).await;

        let results = index.search("query", 3).await.unwrap();
        let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
        assert_eq!(texts, vec!["Article 9", "Article 8", "Article 7"]);
    }

    #[tokio::test]
    async fn test_zero_query_embedding_keeps_insertion_order() {
        let provider = FixedProvider::new(&[
            ("first", vec![1.0, 0.0, 0.0]),
            ("second", vec![0.0, 1.0, 0.0]),
        ]);
        let (_temp, index) = build(provider, &["first", "second"]).await;

        // Unknown text embeds to zeros, so every score is 0.0
        let results = index.search("unknown", 2).await.unwrap();
        assert_eq!(results[0].chunk.text, "first");
        assert_eq!(results[1].chunk.text, "second");
    }

    #[tokio::test]
    async fn test_mismatched_vector_length_rejected() {
        #[derive(Debug)]
        struct ShortProvider;

        #[async_trait::async_trait]
        impl EmbeddingProvider for ShortProvider {
            fn provider_name(&self) -> &str {
                "short"
            }
            fn model_name(&self) -> &str {
                "short-v1"
            }
            fn dimensions(&self) -> usize {
                4
            }
            async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
                Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
            }
        }

        let temp = TempDir::new().unwrap();
        let result = VectorIndex::build(
            temp.path(),
            vec![chunk("Article 1")],
            "tax",
            false,
            Arc::new(ShortProvider),
        )
        .await;
        assert!(matches!(result, Err(AppError::Backend(_))));
    }
}

#[cfg(test)]
mod citation_tests {
    use crate::embeddings::providers::TrigramProvider;
    use crate::parser::tests::write_test_pdf;
    use crate::rag::RagService;
    use crate::types::PageNumber;
    use std::sync::Arc;
    use taxrag_core::{AppResult, Settings};
    use taxrag_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
    use tempfile::TempDir;

    struct EchoLlm;

    #[async_trait::async_trait]
    impl LlmClient for EchoLlm {
        fn provider_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            Ok(LlmResponse {
                content: format!("{} chars of prompt", request.prompt.len()),
                model: request.model.clone(),
                usage: LlmUsage::new(1, 1),
                stop_reason: None,
            })
        }
    }

    #[tokio::test]
    async fn test_answer_cites_pdf_page() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::for_workspace(temp.path());
        std::fs::create_dir_all(&settings.documents_dir).unwrap();
        std::fs::create_dir_all(settings.prompts_file.parent().unwrap()).unwrap();
        std::fs::write(
            &settings.prompts_file,
            "base:\n  system: Tax assistant.\n  template: \"{{context}}\\n{{question}}\"\n",
        )
        .unwrap();
        write_test_pdf(
            &settings.documents_dir.join("vat_law.pdf"),
            &[
                "Chapter one defines taxable persons",
                "Chapter two covers registration deadlines",
                "The standard rate is eighteen percent",
            ],
        );

        let mut service = RagService::new(
            settings,
            Arc::new(EchoLlm),
            Arc::new(TrigramProvider::new(384)),
        );
        service.initialize().await.unwrap();

        let answer = service.ask("what is the standard rate?").await.unwrap();
        let top = &answer.sources[0];
        assert_eq!(top.file, "vat_law.pdf");
        assert_eq!(top.page, PageNumber::Number(3));
        assert!(top.content_preview.contains("standard rate"));
        assert_eq!(answer.sources.len(), 3);
    }

    #[tokio::test]
    async fn test_preview_is_first_200_chars() {
        let temp = TempDir::new().unwrap();
        let settings = Settings::for_workspace(temp.path());
        std::fs::create_dir_all(&settings.documents_dir).unwrap();
        std::fs::create_dir_all(settings.prompts_file.parent().unwrap()).unwrap();
        std::fs::write(
            &settings.prompts_file,
            "base:\n  system: Tax assistant.\n  template: \"{{context}}\\n{{question}}\"\n",
        )
        .unwrap();

        let text = "Article 166 sets the standard rate of value added tax. ".repeat(12);
        let text = text.trim().to_string();
        std::fs::write(settings.documents_dir.join("vat_code.txt"), &text).unwrap();

        let mut service = RagService::new(
            settings,
            Arc::new(EchoLlm),
            Arc::new(TrigramProvider::new(384)),
        );
        service.initialize().await.unwrap();

        let answer = service.ask("standard rate of value added tax").await.unwrap();
        let expected: String = text.chars().take(200).collect();
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].page, PageNumber::Unknown);
        assert_eq!(answer.sources[0].content_preview, expected);
    }
}
