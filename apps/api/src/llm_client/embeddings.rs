//! Text embeddings via Gemini `batchEmbedContents`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Content, LlmClient, LlmError, GEMINI_API_BASE};

/// Gemini accepts at most 100 requests per batch call.
const MAX_BATCH: usize = 100;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds passages for storage. Returns one vector per input, in order.
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;

    /// Embeds a search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, LlmError>;
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedRequest<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: TaskType,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl LlmClient {
    async fn embed_batch(
        &self,
        texts: &[&str],
        task_type: TaskType,
    ) -> Result<Vec<Vec<f32>>, LlmError> {
        let mut vectors = Vec::with_capacity(texts.len());
        let url = format!(
            "{GEMINI_API_BASE}/{}:batchEmbedContents",
            self.embedding_model
        );

        for batch in texts.chunks(MAX_BATCH) {
            let request_body = BatchEmbedRequest {
                requests: batch
                    .iter()
                    .map(|text| EmbedRequest {
                        model: &self.embedding_model,
                        content: Content::text(None, text),
                        task_type,
                    })
                    .collect(),
            };

            let response: BatchEmbedResponse =
                self.post_json(&url, &request_body).await?.json().await?;

            if response.embeddings.len() != batch.len() {
                return Err(LlmError::EmbeddingCount {
                    expected: batch.len(),
                    got: response.embeddings.len(),
                });
            }

            vectors.extend(response.embeddings.into_iter().map(|e| e.values));
        }

        debug!("Embedded {} texts", vectors.len());
        Ok(vectors)
    }
}

#[async_trait]
impl Embedder for LlmClient {
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
        self.embed_batch(&texts, TaskType::RetrievalDocument).await
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.embed_batch(&[text], TaskType::RetrievalQuery)
            .await?
            .into_iter()
            .next()
            .ok_or(LlmError::EmbeddingCount {
                expected: 1,
                got: 0,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_request_shape() {
        let request = BatchEmbedRequest {
            requests: vec![EmbedRequest {
                model: "models/embedding-001",
                content: Content::text(None, "Rust engineer"),
                task_type: TaskType::RetrievalQuery,
            }],
        };
        let value = serde_json::to_value(&request).unwrap();
        let first = &value["requests"][0];
        assert_eq!(first["model"], "models/embedding-001");
        assert_eq!(first["taskType"], "RETRIEVAL_QUERY");
        assert_eq!(first["content"]["parts"][0]["text"], "Rust engineer");
    }

    #[test]
    fn test_embed_response_parses_values() {
        let json = r#"{"embeddings": [{"values": [0.1, 0.2]}, {"values": [0.3, 0.4]}]}"#;
        let response: BatchEmbedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.embeddings.len(), 2);
        assert_eq!(response.embeddings[1].values, vec![0.3, 0.4]);
    }
}
