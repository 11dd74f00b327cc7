use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A resume uploaded into a session. Owned by exactly one session.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub id: Uuid,
    pub filename: String,
    /// Sanitized text extracted from the PDF. Not returned over the API.
    #[serde(skip_serializing)]
    pub text: String,
    pub page_count: usize,
    pub byte_size: usize,
    pub char_count: usize,
    pub chunk_count: usize,
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn new(filename: String, text: String, page_count: usize, byte_size: usize) -> Self {
        let char_count = text.chars().count();
        Self {
            id: Uuid::new_v4(),
            filename,
            text,
            page_count,
            byte_size,
            char_count,
            chunk_count: 0,
            uploaded_at: Utc::now(),
        }
    }
}
