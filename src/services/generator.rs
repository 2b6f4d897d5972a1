//! Ollama-compatible text generation client

use super::{GenerationRequest, ServiceError, TextGenerator};
use crate::config::LlmConfig;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Calls `POST <endpoint>/api/generate` with streaming disabled
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Client,
    url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OllamaGenerator {
    pub fn new(client: Client, config: &LlmConfig) -> Self {
        Self {
            client,
            url: format!("{}/api/generate", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(Client::new(), config)
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError> {
        let body = GenerateBody {
            model: &self.model,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature.unwrap_or(self.temperature),
                num_predict: request.max_tokens.unwrap_or(self.max_tokens),
            },
        };

        tracing::debug!(
            model = %self.model,
            prompt_length = request.prompt.len(),
            "Calling text generator"
        );

        let response = self
            .client
            .post(&self.url)
            .json(&body)
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

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))?;

        let text = parsed.response.trim();
        if text.is_empty() {
            return Err(ServiceError::EmptyResponse);
        }

        tracing::debug!(response_length = text.len(), "Text generator responded");
        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn generator(server: &MockServer) -> OllamaGenerator {
        let config = LlmConfig {
            endpoint: format!("{}/", server.uri()),
            ..LlmConfig::default()
        };
        OllamaGenerator::from_config(&config)
    }

    #[tokio::test]
    async fn test_generate_sends_options() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(json!({
                "model": "llama3.1:8b",
                "prompt": "Say hi",
                "stream": false,
                "options": {"num_predict": 50}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "model": "llama3.1:8b",
                "response": "  hi there  ",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = generator(&server)
            .generate(&GenerationRequest::new("Say hi").with_max_tokens(50))
            .await
            .unwrap();

        assert_eq!(text, "hi there");
    }

    #[tokio::test]
    async fn test_generate_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = generator(&server)
            .generate(&GenerationRequest::new("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_generate_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": ""})))
            .mount(&server)
            .await;

        let err = generator(&server)
            .generate(&GenerationRequest::new("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::EmptyResponse));
    }
}
