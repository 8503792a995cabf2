//! Document extraction: turns an uploaded PDF into analysis-ready text.
//!
//! Pipeline: per-page text → `--- Page N ---` delimiters → whitespace collapse →
//! truncation to `MAX_DOCUMENT_CHARS` with a visible marker.
//!
//! Parsing is delegated to `pdf-extract` behind the `PageExtractor` trait. The parser
//! runs on the blocking pool; a panic inside it is reported as an extraction error.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Characters (Unicode scalar values) kept for analysis.
pub const MAX_DOCUMENT_CHARS: usize = 20_000;

/// Appended after the kept prefix when a document is cut.
pub const TRUNCATION_MARKER: &str =
    "\n\n[注意：文本已截取至 20000 字符，完整内容请参考原文件]";

/// Characters shown in the upload preview.
pub const PREVIEW_CHARS: usize = 1000;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("PDF could not be parsed: {0}")]
    Parse(String),

    #[error("PDF parser aborted while reading the document")]
    Aborted,
}

/// Returns the text of each page, in order.
#[async_trait]
pub trait PageExtractor: Send + Sync {
    async fn pages(&self, bytes: Bytes) -> Result<Vec<String>, ExtractError>;
}

/// Production extractor backed by `pdf-extract`.
pub struct PdfPageExtractor;

#[async_trait]
impl PageExtractor for PdfPageExtractor {
    async fn pages(&self, bytes: Bytes) -> Result<Vec<String>, ExtractError> {
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes))
            .await
            .map_err(|_| ExtractError::Aborted)?
            .map_err(|e| ExtractError::Parse(e.to_string()))
    }
}

/// A parsed upload, keyed by filename within a session.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub filename: String,
    pub page_count: usize,
    /// Collapsed text, possibly truncated and suffixed with `TRUNCATION_MARKER`.
    pub text: String,
    pub truncated: bool,
    /// Length of the collapsed text before truncation.
    pub original_chars: usize,
    /// False when no page yielded any text (zero pages, or scanned images only).
    pub has_text: bool,
}

impl ExtractedDocument {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// First `PREVIEW_CHARS` characters, with `...` when cut.
    pub fn preview(&self) -> String {
        if self.char_count() > PREVIEW_CHARS {
            let head: String = self.text.chars().take(PREVIEW_CHARS).collect();
            format!("{head}...")
        } else {
            self.text.clone()
        }
    }
}

/// Joins pages with 1-based `--- Page N ---` delimiters.
pub fn assemble_pages(pages: &[String]) -> String {
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| format!("\n--- Page {} ---\n{}\n", i + 1, page))
        .collect()
}

/// Collapses every whitespace run to a single space and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Cuts text longer than `MAX_DOCUMENT_CHARS` and appends the marker.
/// Returns the text and whether it was cut.
pub fn truncate_for_analysis(text: String) -> (String, bool) {
    match text.char_indices().nth(MAX_DOCUMENT_CHARS) {
        Some((cut, _)) => {
            let mut kept = text;
            kept.truncate(cut);
            kept.push_str(TRUNCATION_MARKER);
            (kept, true)
        }
        None => (text, false),
    }
}

/// Runs the full extraction pipeline for one upload.
pub async fn extract_document(
    extractor: &dyn PageExtractor,
    filename: &str,
    bytes: Bytes,
) -> Result<ExtractedDocument, ExtractError> {
    debug!("Extracting '{filename}' ({} bytes)", bytes.len());
    let pages = extractor.pages(bytes).await?;

    let has_text = pages.iter().any(|page| !page.trim().is_empty());
    let collapsed = collapse_whitespace(&assemble_pages(&pages));
    let original_chars = collapsed.chars().count();
    let (text, truncated) = truncate_for_analysis(collapsed);

    info!(
        "Extracted '{filename}': {} pages, {original_chars} chars{}",
        pages.len(),
        if truncated { " (truncated)" } else { "" }
    );

    Ok(ExtractedDocument {
        filename: filename.to_string(),
        page_count: pages.len(),
        text,
        truncated,
        original_chars,
        has_text,
    })
}
