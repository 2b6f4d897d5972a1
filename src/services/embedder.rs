//! Ollama-compatible embedding client

use super::{Embedder, ServiceError};
use crate::config::EmbeddingConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct EmbeddingBody<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    #[serde(default)]
    embedding: Vec<f32>,
}

/// Calls `POST <endpoint>/api/embeddings` and L2-normalizes the result
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: Client,
    url: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    pub fn new(client: Client, config: &EmbeddingConfig) -> Self {
        Self {
            client,
            url: format!("{}/api/embeddings", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            dimension: config.dimension,
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        Self::new(Client::new(), config)
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }

        let response = self
            .client
            .post(&self.url)
            .json(&EmbeddingBody {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|source| ServiceError::Http {
                endpoint: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::Status {
                endpoint: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        if parsed.embedding.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }
        if parsed.embedding.len() != self.dimension {
            return Err(ServiceError::DimensionMismatch {
                expected: self.dimension,
                actual: parsed.embedding.len(),
            });
        }

        Ok(l2_normalize(parsed.embedding))
    }
}

/// Scales a vector to unit length; zero vectors are returned unchanged
pub fn l2_normalize(mut vector: Vec<f32>) -> Vec<f32> {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedder(server: &MockServer, dimension: usize) -> OllamaEmbedder {
        let config = EmbeddingConfig {
            endpoint: server.uri(),
            model: "all-minilm".to_string(),
            dimension,
        };
        OllamaEmbedder::from_config(&config)
    }

    #[test]
    fn test_l2_normalize() {
        let v = l2_normalize(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert_eq!(l2_normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_empty_input_is_zero_vector_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let vector = embedder(&server, 4).embed("   ").await.unwrap();
        assert_eq!(vector, vec![0.0; 4]);
    }

    #[tokio::test]
    async fn test_embed_normalizes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(json!({"model": "all-minilm", "prompt": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [0.0, 3.0, 0.0, 4.0]})))
            .mount(&server)
            .await;

        let vector = embedder(&server, 4).embed("hello").await.unwrap();
        assert_eq!(vector.len(), 4);
        assert!((vector[1] - 0.6).abs() < 1e-6);
        assert!((vector[3] - 0.8).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"embedding": [1.0, 2.0]})))
            .mount(&server)
            .await;

        let err = embedder(&server, 384).embed("hello").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::DimensionMismatch {
                expected: 384,
                actual: 2
            }
        ));
    }
}
