//! Flat in-memory vector index with exact cosine search.
//!
//! Resume sets are small (tens of documents, hundreds of chunks), so a linear
//! scan beats maintaining an ANN structure. One index per session.

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Chunk, SearchHit};

#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    #[error("embedding has {got} dimensions, index expects {expected}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("embedding is empty")]
    EmptyEmbedding,
}

#[derive(Debug, Clone)]
struct Entry {
    chunk: Chunk,
    norm: f32,
}

#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Vec<Entry>,
    dimensions: Option<usize>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    /// Inserts a batch of embedded chunks. The batch is validated up front, so
    /// either every chunk is inserted or none is.
    pub fn insert_batch(&mut self, chunks: Vec<Chunk>) -> Result<(), IndexError> {
        let mut expected = self.dimensions;
        for chunk in &chunks {
            let got = chunk.embedding.len();
            if got == 0 {
                return Err(IndexError::EmptyEmbedding);
            }
            match expected {
                Some(expected) if expected != got => {
                    return Err(IndexError::DimensionMismatch { expected, got });
                }
                _ => expected = Some(got),
            }
        }

        self.dimensions = expected;
        self.entries.extend(chunks.into_iter().map(|chunk| Entry {
            norm: l2_norm(&chunk.embedding),
            chunk,
        }));
        Ok(())
    }

    /// Removes every chunk of a document. Returns the number removed.
    pub fn remove_document(&mut self, document_id: Uuid) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.chunk.document_id != document_id);
        if self.entries.is_empty() {
            self.dimensions = None;
        }
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.dimensions = None;
    }

    /// Returns the `k` chunks most similar to `query`, best first.
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, IndexError> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        if let Some(expected) = self.dimensions {
            if query.len() != expected {
                return Err(IndexError::DimensionMismatch {
                    expected,
                    got: query.len(),
                });
            }
        }

        let query_norm = l2_norm(query);
        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (i, cosine(query, query_norm, &e.chunk.embedding, e.norm)))
            .collect();

        // Stable sort keeps earlier chunks ahead on ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchHit {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect())
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn cosine(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let score = dot / (a_norm * b_norm);
    // NaN components score as unrelated rather than outranking everything
    if score.is_finite() {
        score
    } else {
        0.0
    }
}
