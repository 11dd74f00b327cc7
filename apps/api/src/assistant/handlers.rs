//! Axum route handlers for chat and candidate ranking.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::assistant::chat::{answer_question, ChatAnswer};
use crate::assistant::ranking::{rank_candidates, CandidateRanking};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub job_description: String,
}

/// POST /api/v1/sessions/:id/chat
///
/// Answers a question about the session's resumes, taking earlier turns into
/// account. Without indexed resumes the reply asks for uploads instead.
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatAnswer>, AppError> {
    let session = state.sessions.get(id).await?;
    let answer = answer_question(
        &session,
        &request.question,
        state.llm.as_ref(),
        state.embedder.as_ref(),
        state.config.chat_top_k,
    )
    .await?;
    Ok(Json(answer))
}

/// POST /api/v1/sessions/:id/rank
///
/// Ranks the session's candidates against a job description.
pub async fn handle_rank(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RankRequest>,
) -> Result<Json<CandidateRanking>, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }

    let session = state.sessions.get(id).await?;
    let ranking = rank_candidates(
        &session,
        &request.job_description,
        state.llm.as_ref(),
        state.embedder.as_ref(),
        state.config.rank_top_k,
    )
    .await?;
    Ok(Json(ranking))
}
