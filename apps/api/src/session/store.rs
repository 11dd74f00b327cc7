//! Session registry. Each session owns its documents, its vector index, and
//! its conversation history, so one session can never see another's chunks.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Chunk, ConversationTurn, Document};
use crate::retrieval::VectorIndex;

pub type SessionHandle = Arc<Mutex<Session>>;

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub documents: Vec<Document>,
    pub index: VectorIndex,
    pub history: Vec<ConversationTurn>,
    /// Bumped on every reset. Work that started under an older epoch must not
    /// publish into the session.
    pub epoch: u64,
    /// Bumped whenever the history is wiped (reset or clear). An answer
    /// generated under an older value is not recorded.
    pub history_generation: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session_id: Uuid,
    pub documents: Vec<String>,
    pub chunk_count: usize,
    pub turn_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Documents and chunks ready to be published into a session.
#[derive(Debug)]
pub struct IndexedBatch {
    pub documents: Vec<Document>,
    pub chunks: Vec<Chunk>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            documents: Vec::new(),
            index: VectorIndex::new(),
            history: Vec::new(),
            epoch: 0,
            history_generation: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            documents: self.documents.iter().map(|d| d.filename.clone()).collect(),
            chunk_count: self.index.len(),
            turn_count: self.history.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn has_documents(&self) -> bool {
        !self.index.is_empty()
    }

    /// Clears documents, index, and history. The session id survives.
    pub fn reset(&mut self) {
        self.documents.clear();
        self.index.clear();
        self.history.clear();
        self.epoch += 1;
        self.history_generation += 1;
        self.touch();
        info!(session_id = %self.id, epoch = self.epoch, "Session reset");
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        self.history_generation += 1;
        self.touch();
    }

    pub fn record_turn(&mut self, turn: ConversationTurn) {
        self.history.push(turn);
        self.touch();
    }

    /// Publishes a batch built under `epoch`. Returns the filenames that
    /// replaced earlier uploads of the same name.
    ///
    /// Fails with `Conflict` if the session was reset since `epoch`.
    pub fn publish(&mut self, epoch: u64, batch: IndexedBatch) -> Result<Vec<String>, AppError> {
        if epoch != self.epoch {
            return Err(AppError::Conflict(
                "session was reset while documents were being indexed".to_string(),
            ));
        }

        // Stage on a copy so a rejected batch leaves the session untouched
        let mut staged = self.index.clone();

        let mut replaced = Vec::new();
        let mut documents = self.documents.clone();
        for document in &batch.documents {
            if let Some(pos) = documents.iter().position(|d| d.filename == document.filename) {
                let old = documents.remove(pos);
                staged.remove_document(old.id);
                replaced.push(old.filename);
            }
        }
        staged.insert_batch(batch.chunks)?;
        documents.extend(batch.documents);

        self.index = staged;
        self.documents = documents;
        self.touch();
        Ok(replaced)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Shared map of live sessions. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SessionSummary {
        let session = Session::new();
        let summary = session.summary();
        self.sessions
            .write()
            .await
            .insert(session.id, Arc::new(Mutex::new(session)));
        info!(session_id = %summary.session_id, "Session created");
        summary
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| info!(session_id = %id, "Session deleted"))
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
