use std::sync::Arc;

use crate::config::Config;
use crate::ingest::RecursiveChunker;
use crate::llm_client::embeddings::Embedder;
use crate::llm_client::ChatModel;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    /// Chat model. Default: the Gemini `LlmClient`.
    pub llm: Arc<dyn ChatModel>,
    /// Embedding backend. Default: the same Gemini `LlmClient`.
    pub embedder: Arc<dyn Embedder>,
    pub chunker: RecursiveChunker,
    pub config: Config,
}

#[cfg(test)]
pub fn test_state(llm: Arc<dyn ChatModel>, embedder: Arc<dyn Embedder>) -> AppState {
    let config = Config {
        google_api_key: "test-key".to_string(),
        chat_model: "gemini-test".to_string(),
        embedding_model: "models/embedding-test".to_string(),
        port: 0,
        rust_log: "debug".to_string(),
        chunk_size: 1000,
        chunk_overlap: 100,
        chat_top_k: 5,
        rank_top_k: 20,
        max_upload_bytes: 1024 * 1024,
    };
    AppState {
        sessions: SessionStore::new(),
        llm,
        embedder,
        chunker: RecursiveChunker::new(config.chunk_size, config.chunk_overlap)
            .expect("valid chunker settings"),
        config,
    }
}
