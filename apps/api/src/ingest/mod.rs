// Document ingestion: PDF text extraction, sanitizing, and chunking.
// Extraction is CPU-bound and runs inside tokio::task::spawn_blocking.

pub mod chunker;
pub mod pdf;
pub mod sanitize;

pub use chunker::RecursiveChunker;
pub use pdf::extract_pdf_text;
