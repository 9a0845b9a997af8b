//! Source file parsing and per-page text extraction.

use crate::types::{PageNumber, PageText};
use std::fs;
use std::path::Path;
use taxrag_core::{AppError, AppResult};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Markdown,
    PlainText,
}

impl DocumentKind {
    /// Detect document kind from file extension. Unsupported files yield `None`.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "md" | "markdown" => Some(Self::Markdown),
            "txt" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Get string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Markdown => "markdown",
            Self::PlainText => "text",
        }
    }
}

/// Extract the text of a document, one entry per logical page.
///
/// PDF pages are numbered from 1 and pages without extractable text are
/// dropped. Text formats produce a single page with unknown page number.
pub fn extract_pages(path: &Path) -> AppResult<Vec<PageText>> {
    let kind = DocumentKind::from_path(path).ok_or_else(|| {
        AppError::Validation(format!("Unsupported document type: {}", path.display()))
    })?;

    match kind {
        DocumentKind::Pdf => extract_pdf_pages(path),
        DocumentKind::Markdown | DocumentKind::PlainText => {
            let text = fs::read_to_string(path)?;
            if !is_likely_text(&text) {
                return Err(AppError::Parse(format!(
                    "Binary content in text file: {}",
                    path.display()
                )));
            }
            Ok(vec![PageText {
                page: PageNumber::Unknown,
                text,
            }])
        }
    }
}

fn extract_pdf_pages(path: &Path) -> AppResult<Vec<PageText>> {
    let doc = lopdf::Document::load(path)
        .map_err(|e| AppError::Parse(format!("Failed to load PDF {}: {}", path.display(), e)))?;

    let mut pages = Vec::new();
    for page_number in doc.get_pages().into_keys() {
        match doc.extract_text(&[page_number]) {
            Ok(text) if !text.trim().is_empty() => pages.push(PageText {
                page: PageNumber::Number(page_number),
                text,
            }),
            Ok(_) => {
                tracing::debug!("Page {} of {:?} has no text", page_number, path);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not extract text from page {} of {:?}: {}",
                    page_number,
                    path,
                    e
                );
            }
        }
    }

    tracing::debug!("Extracted {} pages from {:?}", pages.len(), path);
    Ok(pages)
}

/// Check if text is likely UTF-8 text (not binary).
fn is_likely_text(data: &str) -> bool {
    !data.contains('\0')
}
