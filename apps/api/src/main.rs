mod assistant;
mod config;
mod errors;
mod ingest;
mod llm_client;
mod models;
mod retrieval;
mod routes;
mod session;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ingest::RecursiveChunker;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast on a missing API key or malformed numbers
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume screener v{}", env!("CARGO_PKG_VERSION"));

    // One Gemini client serves both chat and embeddings
    let llm = Arc::new(LlmClient::new(
        config.google_api_key.clone(),
        config.chat_model.clone(),
        config.embedding_model.clone(),
    )?);
    info!(
        chat_model = llm.chat_model(),
        embedding_model = llm.embedding_model(),
        "LLM client initialized"
    );

    let chunker = RecursiveChunker::new(config.chunk_size, config.chunk_overlap)?;
    info!(
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        "Chunker configured"
    );

    let state = AppState {
        sessions: SessionStore::new(),
        llm: llm.clone(),
        embedder: llm,
        chunker,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the UI host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
