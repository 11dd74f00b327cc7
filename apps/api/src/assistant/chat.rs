//! History-aware question answering over a session's resumes.
//!
//! 1. With prior turns, the model first rewrites the question as a standalone
//!    question; retrieval uses the rewrite.
//! 2. The top-k passages are labelled by resume file and passed to the model
//!    with the conversation history and the original question.
//! 3. The exchange is appended to the session history.

use serde::Serialize;
use tracing::{debug, info};

use crate::assistant::context::{format_context, SourcePassage};
use crate::assistant::prompts::{ANSWER_SYSTEM_TEMPLATE, CONTEXTUALIZE_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::embeddings::Embedder;
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::ChatModel;
use crate::models::conversation::history_messages;
use crate::models::{ChatMessage, ConversationTurn};
use crate::session::SessionHandle;

/// Returned verbatim when the session has nothing indexed.
pub const NO_DOCUMENTS_REPLY: &str = "Please upload some resumes first.";

#[derive(Debug, Serialize)]
pub struct ChatAnswer {
    pub answer: String,
    /// The rewritten question used for retrieval, when it differs from the input.
    pub standalone_question: Option<String>,
    pub sources: Vec<SourcePassage>,
}

pub async fn answer_question(
    session: &SessionHandle,
    question: &str,
    model: &dyn ChatModel,
    embedder: &dyn Embedder,
    top_k: usize,
) -> Result<ChatAnswer, AppError> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("question cannot be empty".to_string()));
    }

    let (generation, history) = {
        let session = session.lock().await;
        if !session.has_documents() {
            return Ok(ChatAnswer {
                answer: NO_DOCUMENTS_REPLY.to_string(),
                standalone_question: None,
                sources: Vec::new(),
            });
        }
        (session.history_generation, history_messages(&session.history))
    };

    let standalone = if history.is_empty() {
        None
    } else {
        let rewritten = contextualize(question, &history, model).await?;
        debug!(original = question, rewritten = %rewritten, "Contextualized question");
        (rewritten != question).then_some(rewritten)
    };
    let retrieval_query = standalone.as_deref().unwrap_or(question);

    let query_embedding = embedder.embed_query(retrieval_query).await?;
    let hits = session
        .lock()
        .await
        .index
        .search(&query_embedding, top_k)?;

    let system = ANSWER_SYSTEM_TEMPLATE
        .replace("{grounding}", GROUNDING_INSTRUCTION)
        .replace("{context}", &format_context(&hits));
    let mut messages = history;
    messages.push(ChatMessage::user(question));

    let answer = model.complete(&system, &messages).await?.trim().to_string();

    let mut guard = session.lock().await;
    // History wiped while the model was answering stays wiped
    if guard.history_generation == generation {
        guard.record_turn(ConversationTurn::new(question.to_string(), answer.clone()));
    }
    info!(
        session_id = %guard.id,
        passages = hits.len(),
        turns = guard.history.len(),
        "Answered question"
    );

    Ok(ChatAnswer {
        answer,
        standalone_question: standalone,
        sources: hits.iter().map(SourcePassage::from).collect(),
    })
}

async fn contextualize(
    question: &str,
    history: &[ChatMessage],
    model: &dyn ChatModel,
) -> Result<String, AppError> {
    let mut messages = history.to_vec();
    messages.push(ChatMessage::user(question));
    let rewritten = model.complete(CONTEXTUALIZE_SYSTEM, &messages).await?;
    let rewritten = rewritten.trim();
    Ok(if rewritten.is_empty() {
        question.to_string()
    } else {
        rewritten.to_string()
    })
}
