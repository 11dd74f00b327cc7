use serde::Serialize;
use uuid::Uuid;

/// An embedded passage of a document. Immutable once indexed.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    pub id: Uuid,
    pub document_id: Uuid,
    /// Filename of the parent document, carried so answers can cite it.
    pub source: String,
    /// Position of this chunk within its document, starting at 0.
    pub ordinal: usize,
    /// Character offset of the span inside the document text.
    pub offset: usize,
    pub text: String,
    #[serde(skip_serializing)]
    pub embedding: Vec<f32>,
}

/// A chunk returned by similarity search, with its cosine score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub score: f32,
}
