//! PDF text extraction. Parsing is CPU-bound and runs inside `spawn_blocking`.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use tracing::info;

use crate::ingest::sanitize::sanitize_extracted_text;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);
const PDF_MAGIC: &[u8] = b"%PDF";
const PAGE_BREAK: char = '\x0C';

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("'{0}' is not a PDF file")]
    NotPdf(String),

    #[error("'{0}' could not be parsed: {1}")]
    Corrupt(String, String),

    #[error("'{0}' contains no extractable text")]
    NoText(String),

    #[error("extraction of '{0}' timed out")]
    Timeout(String),

    #[error("extraction task failed: {0}")]
    Join(String),
}

/// Text pulled from one PDF, already sanitized.
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub page_count: usize,
}

/// Returns true when the upload looks like a PDF by name/content type and magic bytes.
pub fn looks_like_pdf(filename: &str, content_type: Option<&str>, data: &[u8]) -> bool {
    let declared = filename.to_ascii_lowercase().ends_with(".pdf")
        || content_type.is_some_and(|ct| ct.eq_ignore_ascii_case("application/pdf"));
    declared && data.starts_with(PDF_MAGIC)
}

/// Extracts and sanitizes the text of a PDF held in memory.
pub async fn extract_pdf_text(
    filename: &str,
    content_type: Option<&str>,
    data: Bytes,
) -> Result<ExtractedText, ExtractionError> {
    if !looks_like_pdf(filename, content_type, &data) {
        return Err(ExtractionError::NotPdf(filename.to_string()));
    }

    let name = filename.to_string();
    let raw = tokio::time::timeout(
        EXTRACTION_TIMEOUT,
        tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data)),
    )
    .await
    .map_err(|_| ExtractionError::Timeout(name.clone()))?
    .map_err(|e| {
        // pdf-extract panics on some malformed inputs; the join error carries it
        if e.is_panic() {
            ExtractionError::Corrupt(name.clone(), "parser panicked".to_string())
        } else {
            ExtractionError::Join(e.to_string())
        }
    })?
    .map_err(|e| ExtractionError::Corrupt(name.clone(), e.to_string()))?;

    let extracted = split_pages(&raw);
    info!(
        filename = %name,
        pages = extracted.page_count,
        chars = extracted.text.chars().count(),
        "PDF text extraction complete"
    );

    if extracted.text.is_empty() {
        return Err(ExtractionError::NoText(name));
    }

    Ok(extracted)
}

/// Splits raw extractor output on form feeds, sanitizes each page, and joins
/// the non-empty pages with a paragraph break.
fn split_pages(raw: &str) -> ExtractedText {
    let pages: Vec<String> = raw
        .split(PAGE_BREAK)
        .map(sanitize_extracted_text)
        .filter(|p| !p.is_empty())
        .collect();

    ExtractedText {
        page_count: pages.len(),
        text: pages.join("\n\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ONE_PAGE_RESUME;

    #[test]
    fn test_looks_like_pdf_requires_magic_bytes() {
        assert!(looks_like_pdf("cv.pdf", None, b"%PDF-1.7 ..."));
        assert!(!looks_like_pdf("cv.pdf", None, b"PK\x03\x04"));
    }

    #[test]
    fn test_looks_like_pdf_accepts_content_type_without_extension() {
        assert!(looks_like_pdf("upload", Some("application/pdf"), b"%PDF-1.4"));
        assert!(!looks_like_pdf("notes.txt", Some("text/plain"), b"%PDF-1.4"));
    }

    #[test]
    fn test_split_pages_drops_blank_pages() {
        let extracted = split_pages("Alice Smith\nRust\x0C   \n \x0CExperience");
        assert_eq!(extracted.page_count, 2);
        assert_eq!(extracted.text, "Alice Smith\nRust\n\nExperience");
    }

    #[test]
    fn test_split_pages_without_form_feed_is_one_page() {
        let extracted = split_pages("Bob Jones\n\nGo developer");
        assert_eq!(extracted.page_count, 1);
    }

    #[tokio::test]
    async fn test_extract_rejects_non_pdf() {
        let err = extract_pdf_text("resume.docx", None, Bytes::from_static(b"PK\x03\x04"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::NotPdf(name) if name == "resume.docx"));
    }

    #[tokio::test]
    async fn test_extract_rejects_truncated_pdf() {
        let result =
            extract_pdf_text("broken.pdf", None, Bytes::from_static(b"%PDF-1.4\n%garbage")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_extract_reads_text_from_valid_pdf() {
        let extracted = extract_pdf_text(
            "alice.pdf",
            Some("application/pdf"),
            Bytes::from_static(ONE_PAGE_RESUME),
        )
        .await
        .unwrap();

        assert_eq!(extracted.page_count, 1);
        assert!(extracted.text.contains("Alice Smith"), "{:?}", extracted.text);
        assert!(extracted.text.contains("Senior Rust Engineer"));
        assert!(extracted.text.contains("Kubernetes"));
        assert!(!extracted.text.contains('\x0C'));
    }
}
