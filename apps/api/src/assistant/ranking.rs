//! Candidate ranking against a job description.
//!
//! Retrieves the passages most similar to the JD, groups them per resume, and
//! asks the model for a JSON ranking. The model's output is normalized here:
//! scores clamped to 0..=100, candidates sorted best first, ranks assigned.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assistant::context::{distinct_sources, format_context};
use crate::assistant::prompts::{RANK_PROMPT_TEMPLATE, RANK_SYSTEM_TEMPLATE};
use crate::errors::AppError;
use crate::llm_client::embeddings::Embedder;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{complete_json, ChatModel};
use crate::session::SessionHandle;

/// Model output, before normalization.
#[derive(Debug, Deserialize)]
struct RankingPayload {
    #[serde(default)]
    candidates: Vec<CandidatePayload>,
    #[serde(default)]
    summary: String,
}

#[derive(Debug, Deserialize)]
struct CandidatePayload {
    #[serde(default)]
    candidate: String,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    match_score: f64,
    #[serde(default)]
    reasoning: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedCandidate {
    pub rank: usize,
    pub candidate: String,
    pub source: Option<String>,
    /// 0 to 100
    pub match_score: u32,
    pub reasoning: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateRanking {
    pub candidates: Vec<RankedCandidate>,
    pub summary: String,
    /// Resume files that contributed at least one passage.
    pub sources: Vec<String>,
    pub passages_considered: usize,
}

pub async fn rank_candidates(
    session: &SessionHandle,
    job_description: &str,
    model: &dyn ChatModel,
    embedder: &dyn Embedder,
    top_k: usize,
) -> Result<CandidateRanking, AppError> {
    let job_description = job_description.trim();
    if job_description.is_empty() {
        return Err(AppError::Validation(
            "job_description cannot be empty".to_string(),
        ));
    }
    if !session.lock().await.has_documents() {
        return Err(AppError::Validation(
            "Please upload and index resumes first".to_string(),
        ));
    }

    let query_embedding = embedder.embed_query(job_description).await?;
    let hits = session
        .lock()
        .await
        .index
        .search(&query_embedding, top_k)?;

    let system = RANK_SYSTEM_TEMPLATE.replace("{json_only}", JSON_ONLY_SYSTEM);
    let prompt = build_rank_prompt(job_description, &format_context(&hits));

    let payload: RankingPayload = complete_json(model, &system, &prompt).await?;
    let candidates = normalize_candidates(payload.candidates);

    info!(
        candidates = candidates.len(),
        passages = hits.len(),
        "Ranked candidates"
    );

    Ok(CandidateRanking {
        candidates,
        summary: payload.summary.trim().to_string(),
        sources: distinct_sources(&hits),
        passages_considered: hits.len(),
    })
}

/// Fills the ranking template. Placeholders are resolved against the template
/// only, so braces inside the job description or the resumes stay literal.
fn build_rank_prompt(job_description: &str, context: &str) -> String {
    let mut prompt = String::with_capacity(
        RANK_PROMPT_TEMPLATE.len() + job_description.len() + context.len(),
    );
    let mut rest = RANK_PROMPT_TEMPLATE;
    while let Some(open) = rest.find('{') {
        prompt.push_str(&rest[..open]);
        let tail = &rest[open..];
        if let Some(after) = tail.strip_prefix("{job_description}") {
            prompt.push_str(job_description);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{context}") {
            prompt.push_str(context);
            rest = after;
        } else {
            prompt.push('{');
            rest = &tail[1..];
        }
    }
    prompt.push_str(rest);
    prompt
}

/// Clamps scores, fills a missing name from the source file, drops entries
/// with neither, sorts by score (ties by name), and numbers the ranks from 1.
fn normalize_candidates(raw: Vec<CandidatePayload>) -> Vec<RankedCandidate> {
    let mut candidates: Vec<RankedCandidate> = raw
        .into_iter()
        .filter_map(|c| {
            let source = c
                .source
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty());
            let name = match c.candidate.trim() {
                "" => source.clone()?,
                name => name.to_string(),
            };
            Some(RankedCandidate {
                rank: 0,
                candidate: name,
                source,
                match_score: clamp_score(c.match_score),
                reasoning: c.reasoning.trim().to_string(),
            })
        })
        .collect();

    candidates.sort_by(|a, b| match b.match_score.cmp(&a.match_score) {
        Ordering::Equal => a.candidate.cmp(&b.candidate),
        other => other,
    });
    for (i, candidate) in candidates.iter_mut().enumerate() {
        candidate.rank = i + 1;
    }
    candidates
}

fn clamp_score(score: f64) -> u32 {
    if score.is_nan() {
        return 0;
    }
    score.clamp(0.0, 100.0).round() as u32
}
