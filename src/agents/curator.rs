//! Curation agent
//!
//! Chooses between two modes on a single threshold:
//!
//! - **full_text**: trimmed page text of at least `min_text_length` characters.
//!   The generator summarizes a bounded prefix; confidence is always 1.0.
//! - **url_only**: anything less. The generator infers metadata from URL
//!   signals; confidence is advisory and always below 1.0.
//!
//! Both modes finish by embedding `"{title}. {summary}"`.

use super::prompt::{full_text_prompt, parse_curation, url_only_prompt};
use super::signals::UrlSignals;
use super::{call_collaborator, CallFailure};
use crate::config::CurationConfig;
use crate::crawler::truncate_chars;
use crate::services::{Embedder, GenerationRequest, ServiceError, TextGenerator};
use crate::state::{Category, CurationMode, CurationStatus, ErrorKind};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Ceiling for URL-only confidence
pub const URL_ONLY_MAX_CONFIDENCE: f64 = 0.95;

/// URL-only inference runs cooler and shorter than full-text analysis
const URL_ONLY_TEMPERATURE: f32 = 0.2;
const URL_ONLY_MAX_TOKENS: u32 = 500;

/// Result of one curation
#[derive(Debug, Clone, PartialEq)]
pub struct CurationOutcome {
    pub success: bool,
    pub status: CurationStatus,
    pub mode: CurationMode,
    pub summary: Option<String>,
    pub tags: BTreeSet<String>,
    pub category: Option<Category>,
    pub confidence: f64,
    pub embedding: Option<Vec<f32>>,
    pub error_kind: Option<ErrorKind>,
    pub error: Option<String>,
}

impl CurationOutcome {
    fn failed(mode: CurationMode, failure: CallFailure) -> Self {
        Self {
            success: false,
            status: CurationStatus::Failed,
            mode,
            summary: None,
            tags: BTreeSet::new(),
            category: None,
            confidence: 0.0,
            embedding: None,
            error_kind: Some(failure.kind),
            error: Some(failure.detail),
        }
    }
}

/// Produces summary, tags, category, confidence and embedding for a URL
pub struct Curator {
    generator: Arc<dyn TextGenerator>,
    embedder: Arc<dyn Embedder>,
    min_text_length: usize,
    text_limit: usize,
    timeout: Duration,
}

impl Curator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn Embedder>,
        config: &CurationConfig,
    ) -> Self {
        Self {
            generator,
            embedder,
            min_text_length: config.min_text_length,
            text_limit: config.text_limit,
            timeout: config.collaborator_timeout(),
        }
    }

    /// Picks the mode for the given text
    pub fn select_mode(&self, full_text: Option<&str>) -> CurationMode {
        match full_text {
            Some(text) if text.trim().chars().count() >= self.min_text_length => {
                CurationMode::FullText
            }
            _ => CurationMode::UrlOnly,
        }
    }

    pub async fn curate(&self, title: &str, full_text: Option<&str>, url: &str) -> CurationOutcome {
        self.curate_with_cancel(title, full_text, url, &CancellationToken::new())
            .await
    }

    /// Curates a URL; collaborator failures are reported in the outcome
    #[instrument(skip_all, fields(url = %url))]
    pub async fn curate_with_cancel(
        &self,
        title: &str,
        full_text: Option<&str>,
        url: &str,
        cancel: &CancellationToken,
    ) -> CurationOutcome {
        let mode = self.select_mode(full_text);

        let (request, signals) = match (mode, full_text) {
            (CurationMode::FullText, Some(text)) => {
                tracing::info!("Curating {} in full_text mode ({} chars)", url, text.len());
                let prefix = truncate_chars(text.trim(), self.text_limit);
                (GenerationRequest::new(full_text_prompt(title, &prefix)), None)
            }
            _ => {
                tracing::warn!("Curating {} in url_only mode (insufficient text)", url);
                let signals = UrlSignals::from_url(url);
                let request = GenerationRequest::new(url_only_prompt(title, &signals))
                    .with_temperature(URL_ONLY_TEMPERATURE)
                    .with_max_tokens(URL_ONLY_MAX_TOKENS);
                (request, Some(signals))
            }
        };

        let raw = match call_collaborator(
            "Text generator",
            self.timeout,
            cancel,
            self.generator.generate(&request),
        )
        .await
        {
            Ok(raw) => raw,
            Err(failure) => {
                tracing::error!("Generation failed for {}: {}", url, failure.detail);
                return CurationOutcome::failed(mode, failure);
            }
        };

        let payload = match parse_curation(&raw) {
            Ok(payload) => payload,
            Err(detail) => {
                tracing::error!("Unparseable generator output for {}: {}", url, detail);
                return CurationOutcome::failed(
                    mode,
                    CallFailure {
                        kind: ErrorKind::ParseError,
                        detail,
                    },
                );
            }
        };

        let confidence = match &signals {
            None => 1.0,
            Some(signals) => payload
                .confidence
                .filter(|c| c.is_finite())
                .map(|c| c.clamp(0.0, URL_ONLY_MAX_CONFIDENCE))
                .unwrap_or_else(|| signals.heuristic_confidence()),
        };

        let embedding_text = format!("{}. {}", title, payload.summary);
        let embedding = match call_collaborator(
            "Embedding service",
            self.timeout,
            cancel,
            self.embed_checked(&embedding_text),
        )
        .await
        {
            Ok(embedding) => embedding,
            Err(failure) => {
                tracing::error!("Embedding failed for {}: {}", url, failure.detail);
                return CurationOutcome::failed(mode, failure);
            }
        };

        let status = match mode {
            CurationMode::FullText => CurationStatus::Success,
            CurationMode::UrlOnly => CurationStatus::Fallback,
        };
        tracing::info!(
            mode = %mode,
            category = %payload.category,
            confidence,
            "Curation succeeded for {}",
            url
        );

        CurationOutcome {
            success: true,
            status,
            mode,
            summary: Some(payload.summary),
            tags: payload.tags,
            category: Some(payload.category),
            confidence,
            embedding: Some(embedding),
            error_kind: None,
            error: None,
        }
    }

    async fn embed_checked(&self, text: &str) -> Result<Vec<f32>, ServiceError> {
        let vector = self.embedder.embed(text).await?;
        let expected = self.embedder.dimension();
        if vector.len() != expected {
            return Err(ServiceError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}
