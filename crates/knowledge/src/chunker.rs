//! Page text splitting with configurable size and overlap.
//!
//! Splitting is delegated to the `text-splitter` crate, which prefers the
//! coarsest semantic boundary that fits (paragraph break, line break, word)
//! and falls back to a hard character cut. Sizes are measured in characters.

use crate::types::{Chunk, PageText};
use taxrag_core::{AppError, AppResult};
use text_splitter::{Characters, ChunkConfig, TextSplitter as ExternalTextSplitter};

/// Splits page text into overlapping chunks.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a splitter. Sizes are measured in characters.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if `chunk_size` is zero or the overlap
    /// is not smaller than the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Validation(
                "chunk_size must be greater than 0".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(AppError::Validation(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                chunk_overlap, chunk_size
            )));
        }

        let splitter = Self {
            chunk_size,
            chunk_overlap,
        };
        splitter.config()?;
        Ok(splitter)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    fn config(&self) -> AppResult<ChunkConfig<Characters>> {
        ChunkConfig::new(self.chunk_size)
            .with_overlap(self.chunk_overlap)
            .map_err(|e| AppError::Validation(format!("Invalid chunk settings: {}", e)))
    }

    /// Split a document's pages into chunks.
    ///
    /// Each page is split on its own, so every chunk keeps the page it came from.
    pub fn chunk_pages(&self, source_id: &str, pages: &[PageText]) -> AppResult<Vec<Chunk>> {
        let splitter = ExternalTextSplitter::new(self.config()?);

        let chunks: Vec<Chunk> = pages
            .iter()
            .flat_map(|page| {
                splitter
                    .chunks(&page.text)
                    .filter(|text| !text.trim().is_empty())
                    .map(|text| Chunk {
                        text: text.trim().to_string(),
                        source_id: source_id.to_string(),
                        page: page.page,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        tracing::debug!(
            "Chunked {} into {} chunks (size: {}, overlap: {})",
            source_id,
            chunks.len(),
            self.chunk_size,
            self.chunk_overlap
        );

        Ok(chunks)
    }

    /// Split text into trimmed, non-empty windows of at most `chunk_size` characters.
    pub fn split(&self, text: &str) -> AppResult<Vec<String>> {
        let splitter = ExternalTextSplitter::new(self.config()?);

        Ok(splitter
            .chunks(text)
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PageNumber;

    #[test]
    fn test_rejects_invalid_sizes() {
        assert!(matches!(
            TextSplitter::new(0, 0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            TextSplitter::new(100, 100),
            Err(AppError::Validation(_))
        ));
        assert!(TextSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let splitter = TextSplitter::new(1000, 200).unwrap();
        let text = "Article 1.\n\nVAT applies to supplies of goods.";
        assert_eq!(splitter.split(text).unwrap(), vec![text.to_string()]);
    }

    #[test]
    fn test_empty_and_blank_text() {
        let splitter = TextSplitter::new(100, 10).unwrap();
        assert!(splitter.split("").unwrap().is_empty());
        assert!(splitter.split("  \n\n \n").unwrap().is_empty());
    }

    #[test]
    fn test_prefers_paragraph_breaks() {
        let splitter = TextSplitter::new(100, 0).unwrap();
        let p1 = "a".repeat(40);
        let p2 = "b".repeat(40);
        let p3 = "c".repeat(40);
        let text = format!("{}\n\n{}\n\n{}", p1, p2, p3);

        let chunks = splitter.split(&text).unwrap();
        assert_eq!(chunks, vec![format!("{}\n\n{}", p1, p2), p3]);
    }

    #[test]
    fn test_chunks_never_exceed_size() {
        let splitter = TextSplitter::new(50, 10).unwrap();
        let text = "The standard rate of value added tax is eighteen percent. \
                    Exports are zero rated.\nFinancial services are exempt.\n\n"
            .repeat(20);

        let chunks = splitter.split(&text).unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50, "too long: {:?}", chunk);
            assert!(!chunk.is_empty());
        }
    }

    #[test]
    fn test_adjacent_chunks_overlap() {
        let splitter = TextSplitter::new(50, 10).unwrap();
        let text = (1..=60)
            .map(|i| format!("w{:04}", i))
            .collect::<Vec<_>>()
            .join(" ");

        let chunks = splitter.split(&text).unwrap();
        assert!(chunks.len() > 2);
        for pair in chunks.windows(2) {
            let first_word = pair[1].split(' ').next().unwrap();
            assert!(
                pair[0].ends_with(first_word),
                "{:?} does not continue {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn test_overlap_repeats_trailing_words() {
        let splitter = TextSplitter::new(100, 30).unwrap();
        let text = (0..80)
            .map(|i| format!("word{:03}", i))
            .collect::<Vec<_>>()
            .join(" ");

        let chunks = splitter.split(&text).unwrap();
        assert!(chunks.len() > 2);
        assert!(chunks[0].starts_with("word000"));

        let first_words: Vec<&str> = chunks[0].split(' ').collect();
        let second_start = chunks[1].split(' ').next().unwrap();
        assert!(first_words.contains(&second_start));
        assert_ne!(second_start, first_words[0]);
    }

    #[test]
    fn test_hard_cut_without_separators() {
        let splitter = TextSplitter::new(100, 20).unwrap();
        let text = "x".repeat(1000);

        let chunks = splitter.split(&text).unwrap();
        assert_eq!(chunks[0].len(), 100);
        assert!(chunks.iter().all(|c| c.len() <= 100));
        assert!(chunks.len() >= 1000 / 100);
    }

    #[test]
    fn test_lengths_counted_in_chars() {
        let splitter = TextSplitter::new(100, 10).unwrap();
        let text = "ႸႸႸ ".repeat(200);

        for chunk in splitter.split(&text).unwrap() {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn test_chunk_pages_keeps_provenance() {
        let splitter = TextSplitter::new(30, 5).unwrap();
        let pages = vec![
            PageText {
                page: PageNumber::Number(1),
                text: "First page about income tax rules.".to_string(),
            },
            PageText {
                page: PageNumber::Number(2),
                text: "Second page.".to_string(),
            },
        ];

        let chunks = splitter.chunk_pages("tax_code.pdf", &pages).unwrap();
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.source_id == "tax_code.pdf"));
        assert_eq!(chunks.last().unwrap().page, PageNumber::Number(2));
        assert_eq!(chunks.last().unwrap().text, "Second page.");
        assert_eq!(chunks[0].page, PageNumber::Number(1));
    }
}
