//! Upload → extract → chunk → embed → publish.
//!
//! Network calls happen without holding the session lock. The session epoch is
//! captured up front and checked again at publish time, so a reset issued
//! while embeddings are in flight discards the batch.

use std::collections::HashSet;

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::ingest::{extract_pdf_text, RecursiveChunker};
use crate::llm_client::embeddings::Embedder;
use crate::llm_client::LlmError;
use crate::models::{Chunk, Document};
use crate::session::store::{IndexedBatch, SessionHandle, SessionSummary};

/// A file received from the client.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A document whose text has been extracted but not yet chunked or embedded.
#[derive(Debug, Clone)]
pub struct PendingDocument {
    pub filename: String,
    pub text: String,
    pub page_count: usize,
    pub byte_size: usize,
}

#[derive(Debug, Serialize)]
pub struct IndexReport {
    pub indexed: Vec<Document>,
    /// Filenames whose earlier upload was replaced by this one.
    pub replaced: Vec<String>,
    pub chunk_count: usize,
    pub session: SessionSummary,
}

/// Extracts every upload. Fails on the first unreadable file, in which case
/// nothing is indexed.
pub async fn extract_uploads(uploads: Vec<Upload>) -> Result<Vec<PendingDocument>, AppError> {
    let mut pending = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let byte_size = upload.data.len();
        let extracted =
            extract_pdf_text(&upload.filename, upload.content_type.as_deref(), upload.data)
                .await?;
        pending.push(PendingDocument {
            filename: upload.filename,
            text: extracted.text,
            page_count: extracted.page_count,
            byte_size,
        });
    }
    Ok(pending)
}

/// Chunks, embeds, and publishes `pending` into the session.
#[instrument(skip_all, fields(documents = pending.len()))]
pub async fn index_documents(
    session: &SessionHandle,
    pending: Vec<PendingDocument>,
    chunker: &RecursiveChunker,
    embedder: &dyn Embedder,
) -> Result<IndexReport, AppError> {
    if pending.is_empty() {
        return Err(AppError::Validation("no files to index".to_string()));
    }

    let epoch = session.lock().await.epoch;

    let mut documents = Vec::new();
    let mut spans = Vec::new();
    for doc in dedup_by_filename(pending) {
        let mut document = Document::new(doc.filename, doc.text, doc.page_count, doc.byte_size);
        let doc_spans = chunker.split(&document.text);
        if doc_spans.is_empty() {
            return Err(AppError::UnprocessableEntity(format!(
                "'{}' contains no extractable text",
                document.filename
            )));
        }
        document.chunk_count = doc_spans.len();
        spans.extend(doc_spans.into_iter().map(|span| (document.id, span)));
        documents.push(document);
    }

    let texts: Vec<String> = spans.iter().map(|(_, span)| span.text.clone()).collect();
    let embeddings = embedder.embed_documents(&texts).await?;
    if embeddings.len() != texts.len() {
        return Err(LlmError::EmbeddingCount {
            expected: texts.len(),
            got: embeddings.len(),
        }
        .into());
    }

    let chunks: Vec<Chunk> = spans
        .into_iter()
        .zip(embeddings)
        .map(|((document_id, span), embedding)| Chunk {
            id: Uuid::new_v4(),
            document_id,
            source: source_for(&documents, document_id),
            ordinal: span.ordinal,
            offset: span.offset,
            text: span.text,
            embedding,
        })
        .collect();
    let chunk_count = chunks.len();

    let mut session = session.lock().await;
    let replaced = session.publish(
        epoch,
        IndexedBatch {
            documents: documents.clone(),
            chunks,
        },
    )?;

    info!(
        session_id = %session.id,
        documents = documents.len(),
        chunks = chunk_count,
        replaced = replaced.len(),
        "Indexed resumes"
    );

    Ok(IndexReport {
        indexed: documents,
        replaced,
        chunk_count,
        session: session.summary(),
    })
}

/// Extracts then indexes a set of uploads.
pub async fn index_uploads(
    session: &SessionHandle,
    uploads: Vec<Upload>,
    chunker: &RecursiveChunker,
    embedder: &dyn Embedder,
) -> Result<IndexReport, AppError> {
    let pending = extract_uploads(uploads).await?;
    index_documents(session, pending, chunker, embedder).await
}

/// Keeps the last upload for each filename, preserving upload order.
fn dedup_by_filename(pending: Vec<PendingDocument>) -> Vec<PendingDocument> {
    let mut seen = HashSet::new();
    let mut kept: Vec<PendingDocument> = pending
        .into_iter()
        .rev()
        .filter(|d| seen.insert(d.filename.clone()))
        .collect();
    kept.reverse();
    kept
}

fn source_for(documents: &[Document], document_id: Uuid) -> String {
    documents
        .iter()
        .find(|d| d.id == document_id)
        .map(|d| d.filename.clone())
        .unwrap_or_default()
}
