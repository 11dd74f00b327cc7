//! Axum route handlers for sessions and their documents.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ConversationTurn, Document, SearchHit};
use crate::session::indexer::{index_uploads, IndexReport, Upload};
use crate::session::store::SessionSummary;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<Document>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub turns: Vec<ConversationTurn>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionSummary>) {
    (StatusCode::CREATED, Json(state.sessions.create().await))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let session = state.sessions.get(id).await?;
    let summary = session.lock().await.summary();
    Ok(Json(summary))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/sessions/:id/reset
///
/// Drops every document, chunk, and chat turn. The session id stays valid.
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionSummary>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.reset();
    Ok(Json(session.summary()))
}

/// POST /api/v1/sessions/:id/documents
///
/// Multipart upload of one or more PDF resumes. Every part with a filename is
/// treated as a file. Either all files are indexed or none are.
pub async fn handle_upload_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<IndexReport>, AppError> {
    let session = state.sessions.get(id).await?;

    let mut uploads = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read '{filename}': {e}")))?;
        tracing::debug!(filename = %filename, bytes = data.len(), "File received");
        uploads.push(Upload {
            filename,
            content_type,
            data,
        });
    }

    if uploads.is_empty() {
        return Err(AppError::Validation("No files uploaded".to_string()));
    }

    let report = index_uploads(
        &session,
        uploads,
        &state.chunker,
        state.embedder.as_ref(),
    )
    .await?;
    Ok(Json(report))
}

/// GET /api/v1/sessions/:id/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentListResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let documents = session.lock().await.documents.clone();
    Ok(Json(DocumentListResponse { documents }))
}

/// POST /api/v1/sessions/:id/search
///
/// Raw retrieval without generation. Useful for inspecting what the model
/// would be shown.
pub async fn handle_search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    if request.query.trim().is_empty() {
        return Err(AppError::Validation("query cannot be empty".to_string()));
    }
    let session = state.sessions.get(id).await?;
    let top_k = request.top_k.unwrap_or(state.config.chat_top_k);

    let embedding = state.embedder.embed_query(&request.query).await?;
    let hits = session.lock().await.index.search(&embedding, top_k)?;
    Ok(Json(SearchResponse { hits }))
}

/// GET /api/v1/sessions/:id/history
pub async fn handle_get_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let turns = session.lock().await.history.clone();
    Ok(Json(HistoryResponse { turns }))
}

/// DELETE /api/v1/sessions/:id/history
///
/// Clears the chat only; indexed resumes are kept.
pub async fn handle_clear_history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let session = state.sessions.get(id).await?;
    session.lock().await.clear_history();
    Ok(StatusCode::NO_CONTENT)
}
