use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for the enricher
///
/// Every section is optional; a missing section falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub local: LocalConfig,
    #[serde(default)]
    pub safety: SafetyConfig,
    #[serde(default)]
    pub curation: CurationConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// Content acquisition behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Per-fetch timeout (milliseconds)
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Maximum attempts for the primary strategy
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Maximum redirects followed by a single fetch
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// Minimum gap between any two outbound fetches (milliseconds)
    #[serde(rename = "delay-between-requests")]
    pub delay_between_requests: u64,

    /// Base delay after an HTTP 429; the wait is `base * attempt` (milliseconds)
    #[serde(rename = "rate-limit-backoff")]
    pub rate_limit_backoff: u64,

    /// Extracted text shorter than this is treated as insufficient (characters)
    #[serde(rename = "min-content-length")]
    pub min_content_length: usize,

    /// Maximum characters kept from fallback extraction
    #[serde(rename = "max-text-length")]
    pub max_text_length: usize,

    /// Maximum characters of raw HTML kept in the snippet
    #[serde(rename = "html-snippet-length")]
    pub html_snippet_length: usize,
}

impl ScraperConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout)
    }

    pub fn pacing_interval(&self) -> Duration {
        Duration::from_millis(self.delay_between_requests)
    }

    /// Wait applied after a rate-limited attempt; grows linearly with the attempt number
    pub fn rate_limit_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.rate_limit_backoff.saturating_mul(u64::from(attempt)))
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            request_timeout: 30_000,
            max_retries: 3,
            max_redirects: 5,
            delay_between_requests: 1_000,
            rate_limit_backoff: 10_000,
            min_content_length: 50,
            max_text_length: 10_000,
            html_snippet_length: 10_000,
        }
    }
}

/// Hosts that are never fetched automatically
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Host patterns (e.g., "localhost", "*.local", "127.0.0.1")
    pub domains: Vec<String>,

    /// Treat loopback, private, link-local and unspecified IP literals as local
    #[serde(rename = "block-private-ips")]
    pub block_private_ips: bool,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            domains: [
                "localhost",
                "127.0.0.1",
                "0.0.0.0",
                "*.local",
                "*.test",
                "*.internal",
                "*.lan",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            block_private_ips: true,
        }
    }
}

/// Safety filter configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    pub enabled: bool,

    #[serde(rename = "nsfw-keywords")]
    pub nsfw_keywords: Vec<String>,

    #[serde(rename = "nsfw-domains")]
    pub nsfw_domains: Vec<String>,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            nsfw_keywords: ["porn", "sex", "xxx", "nude", "casino", "gambling"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            nsfw_domains: vec!["pornhub.com".to_string(), "xvideos.com".to_string()],
        }
    }
}

/// Curation agent configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    /// Trimmed text at or above this length selects full-text mode (characters)
    #[serde(rename = "min-text-length")]
    pub min_text_length: usize,

    /// Characters of page text handed to the generator
    #[serde(rename = "text-limit")]
    pub text_limit: usize,

    /// Timeout for each generator or embedding call (milliseconds)
    #[serde(rename = "collaborator-timeout")]
    pub collaborator_timeout: u64,

    /// Ask the generator for a better title when the page title is generic
    #[serde(rename = "enhance-generic-titles")]
    pub enhance_generic_titles: bool,
}

impl CurationConfig {
    pub fn collaborator_timeout(&self) -> Duration {
        Duration::from_millis(self.collaborator_timeout)
    }
}

impl Default for CurationConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            text_limit: 3_000,
            collaborator_timeout: 60_000,
            enhance_generic_titles: true,
        }
    }
}

/// Text-generation service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the Ollama-compatible service
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    #[serde(rename = "max-tokens")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            temperature: 0.3,
            max_tokens: 2048,
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub endpoint: String,
    pub model: String,
    /// Length of every vector the pipeline stores
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            dimension: 384,
        }
    }
}
