//! External collaborators: text generation and embeddings
//!
//! The pipeline depends only on the [`TextGenerator`] and [`Embedder`]
//! traits. Both are constructed once at startup and shared as trait objects;
//! the HTTP implementations talk to an Ollama-compatible service.

mod embedder;
mod generator;

pub use embedder::{l2_normalize, OllamaEmbedder};
pub use generator::OllamaGenerator;

use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a collaborator
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Service returned an empty response")]
    EmptyResponse,
}

/// One prompt for the text generator
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Overrides the service's configured temperature
    pub temperature: Option<f32>,
    /// Overrides the service's configured output limit
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Free-form text generation
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the raw generated text; callers parse any structure out of it
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ServiceError>;
}

/// Fixed-dimension text embeddings
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Length of every vector returned by [`Embedder::embed`]
    fn dimension(&self) -> usize;

    /// Embeds `text`; empty input yields a zero vector of [`Embedder::dimension`] length
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ServiceError>;
}
