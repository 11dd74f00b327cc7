//! Test doubles for the hosted model and the embedder.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::llm_client::embeddings::Embedder;
use crate::llm_client::{ChatModel, LlmError};
use crate::models::ChatMessage;

const DIMENSIONS: usize = 256;

/// A one-page PDF with three lines of Helvetica text.
pub const ONE_PAGE_RESUME: &[u8] = include_bytes!("ingest/testdata/one_page_resume.pdf");

/// Deterministic bag-of-words embedder: every lowercase token is hashed into
/// one of 256 buckets. Texts sharing words get positive cosine similarity.
#[derive(Default)]
pub struct FakeEmbedder {
    pub document_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
}

impl FakeEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut v = vec![0.0; DIMENSIONS];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let bucket = token
                .to_lowercase()
                .bytes()
                .fold(7usize, |h, b| h.wrapping_mul(31).wrapping_add(b as usize));
            v[bucket % DIMENSIONS] += 1.0;
        }
        v
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector(text))
    }
}

/// Embedder that parks inside `embed_documents` until released.
#[derive(Default)]
pub struct GatedEmbedder {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[async_trait]
impl Embedder for GatedEmbedder {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(texts.iter().map(|t| FakeEmbedder::vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        Ok(FakeEmbedder::vector(text))
    }
}

/// A recorded call to [`ScriptedModel`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub messages: Vec<ChatMessage>,
}

/// Chat model that replies from a queue and records every call.
/// An exhausted queue yields `LlmError::EmptyContent`.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            messages: messages.to_vec(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(LlmError::EmptyContent)
    }
}

/// Creates a session and indexes `(filename, text)` pairs into it.
pub async fn seeded_session(
    store: &crate::session::SessionStore,
    documents: &[(&str, &str)],
) -> crate::session::SessionHandle {
    let session = store
        .get(store.create().await.session_id)
        .await
        .expect("session exists");
    if !documents.is_empty() {
        let pending = documents
            .iter()
            .map(|(filename, text)| crate::session::indexer::PendingDocument {
                filename: filename.to_string(),
                text: text.to_string(),
                page_count: 1,
                byte_size: text.len(),
            })
            .collect();
        let chunker = crate::ingest::RecursiveChunker::new(1000, 100).expect("valid chunker");
        crate::session::indexer::index_documents(
            &session,
            pending,
            &chunker,
            &FakeEmbedder::default(),
        )
        .await
        .expect("documents index");
    }
    session
}
