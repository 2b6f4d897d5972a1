//! Bookmark Enricher: resilient URL content acquisition and enrichment
//!
//! This crate fetches an arbitrary URL, extracts its text even when the site
//! pushes back on automated clients, classifies it for safety, and curates
//! it into a summary, tags, a category, and an embedding vector. When the
//! page cannot be fetched, curation degrades to inference from URL signals
//! alone so the caller still receives usable, lower-confidence metadata.

pub mod agents;
pub mod config;
pub mod crawler;
pub mod output;
pub mod pipeline;
pub mod safety;
pub mod services;
pub mod state;
pub mod url;

use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Main error type for Bookmark Enricher operations
///
/// Expected pipeline failures (blocked fetches, bad generator output) are
/// reported as [`state::ErrorKind`] values inside results, not through this type.
#[derive(Debug, Error)]
pub enum EnricherError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid domain pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Bookmark Enricher operations
pub type Result<T> = std::result::Result<T, EnricherError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Drives `fut` to completion unless `cancel` fires first
///
/// Returns `None` when cancelled; the future is dropped at its current
/// suspension point.
pub async fn until_cancelled<F: Future>(cancel: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        output = fut => Some(output),
    }
}

// Re-export commonly used types
pub use agents::{Archivist, Curator};
pub use config::Config;
pub use crawler::{ResilientScraper, ScrapeResult};
pub use pipeline::{PipelineOrchestrator, PipelineResult};
pub use safety::{ClassificationVerdict, SafetyClassifier};
pub use state::{ErrorKind, PipelineStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions() {
        let err: EnricherError = ConfigError::Validation("max-retries must be 1..=10".into()).into();
        assert!(matches!(err, EnricherError::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Validation error: max-retries must be 1..=10"
        );

        let err: EnricherError = UrlError::MissingDomain.into();
        assert!(matches!(err, EnricherError::Url(UrlError::MissingDomain)));

        let err = EnricherError::Invariant("empty text".into());
        assert_eq!(err.to_string(), "Invariant violated: empty text");
    }

    #[tokio::test]
    async fn test_until_cancelled() {
        let cancel = CancellationToken::new();
        assert_eq!(until_cancelled(&cancel, async { 7 }).await, Some(7));

        cancel.cancel();
        assert_eq!(until_cancelled(&cancel, std::future::pending::<u8>()).await, None);
    }
}
