use serde::Serialize;

use crate::models::SearchHit;

/// A retrieved passage as returned to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct SourcePassage {
    pub source: String,
    pub ordinal: usize,
    pub score: f32,
    pub text: String,
}

impl From<&SearchHit> for SourcePassage {
    fn from(hit: &SearchHit) -> Self {
        Self {
            source: hit.chunk.source.clone(),
            ordinal: hit.chunk.ordinal,
            score: hit.score,
            text: hit.chunk.text.clone(),
        }
    }
}

/// Renders retrieved passages for a prompt, grouped per resume file. Files
/// appear in order of their best hit; passages keep retrieval order.
pub fn format_context(hits: &[SearchHit]) -> String {
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for hit in hits {
        let source = hit.chunk.source.as_str();
        match groups.iter().position(|(s, _)| *s == source) {
            Some(i) => groups[i].1.push(hit.chunk.text.as_str()),
            None => groups.push((source, vec![hit.chunk.text.as_str()])),
        }
    }

    groups
        .into_iter()
        .map(|(source, passages)| format!("[Resume: {source}]\n{}", passages.join("\n\n")))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// Distinct resume files among the hits, in order of first appearance.
pub fn distinct_sources(hits: &[SearchHit]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for hit in hits {
        if !sources.iter().any(|s| *s == hit.chunk.source) {
            sources.push(hit.chunk.source.clone());
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Chunk;
    use uuid::Uuid;

    fn hit(source: &str, text: &str, score: f32) -> SearchHit {
        SearchHit {
            chunk: Chunk {
                id: Uuid::new_v4(),
                document_id: Uuid::new_v4(),
                source: source.to_string(),
                ordinal: 0,
                offset: 0,
                text: text.to_string(),
                embedding: vec![],
            },
            score,
        }
    }

    #[test]
    fn test_format_context_groups_by_source() {
        let hits = vec![
            hit("alice.pdf", "Rust, 6 years", 0.9),
            hit("bob.pdf", "Go, 3 years", 0.8),
            hit("alice.pdf", "Led platform team", 0.7),
        ];
        assert_eq!(
            format_context(&hits),
            "[Resume: alice.pdf]\nRust, 6 years\n\nLed platform team\n\n---\n\n[Resume: bob.pdf]\nGo, 3 years"
        );
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_distinct_sources_keeps_first_appearance() {
        let hits = vec![hit("b.pdf", "x", 0.9), hit("a.pdf", "y", 0.5), hit("b.pdf", "z", 0.4)];
        assert_eq!(distinct_sources(&hits), vec!["b.pdf", "a.pdf"]);
    }
}
