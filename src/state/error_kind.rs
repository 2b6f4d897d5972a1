use serde::{Deserialize, Serialize};
use std::fmt;

/// Error taxonomy shared by every pipeline stage
///
/// Expected failures are carried as data in stage outcomes; the wire strings
/// returned by [`ErrorKind::as_str`] are the values stored by downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    // ===== Policy =====
    /// Host is on the local/private allow-list; needs manual capture, not a failure
    LocalUrl,

    // ===== Acquisition =====
    /// HTTP 403, the site is actively refusing automated clients
    BotDetection,

    /// HTTP 429
    RateLimited,

    /// Transport timeout
    Timeout,

    /// Could not connect to the host
    ConnectionRefused,

    /// HTTP 5xx or any other non-success status
    HttpError,

    /// Extraction succeeded but produced too little text
    InsufficientContent,

    /// The generic fallback extraction failed
    #[serde(rename = "beautifulsoup_failed")]
    FallbackFailed,

    /// The input is not an absolute http(s) URL
    InvalidUrl,

    // ===== Any stage =====
    /// Internal defect or unclassified failure
    UnexpectedError,

    /// The caller cancelled the run
    Cancelled,

    // ===== Curation =====
    /// Generator output did not contain the expected structure
    ParseError,

    /// Generation or embedding service failed or timed out
    CollaboratorError,
}

impl ErrorKind {
    /// Returns the wire string for this error kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LocalUrl => "local_url",
            Self::BotDetection => "bot_detection",
            Self::RateLimited => "rate_limited",
            Self::Timeout => "timeout",
            Self::ConnectionRefused => "connection_refused",
            Self::HttpError => "http_error",
            Self::InsufficientContent => "insufficient_content",
            Self::FallbackFailed => "beautifulsoup_failed",
            Self::InvalidUrl => "invalid_url",
            Self::UnexpectedError => "unexpected_error",
            Self::Cancelled => "cancelled",
            Self::ParseError => "parse_error",
            Self::CollaboratorError => "collaborator_error",
        }
    }

    /// Parses a wire string; returns None for unknown values
    pub fn from_wire(s: &str) -> Option<Self> {
        Self::all().into_iter().find(|kind| kind.as_str() == s)
    }

    /// Returns every error kind
    pub fn all() -> Vec<Self> {
        vec![
            Self::LocalUrl,
            Self::BotDetection,
            Self::RateLimited,
            Self::Timeout,
            Self::ConnectionRefused,
            Self::HttpError,
            Self::InsufficientContent,
            Self::FallbackFailed,
            Self::InvalidUrl,
            Self::UnexpectedError,
            Self::Cancelled,
            Self::ParseError,
            Self::CollaboratorError,
        ]
    }

    /// Returns true for kinds produced while acquiring page content
    pub fn is_acquisition(&self) -> bool {
        matches!(
            self,
            Self::BotDetection
                | Self::RateLimited
                | Self::Timeout
                | Self::ConnectionRefused
                | Self::HttpError
                | Self::InsufficientContent
                | Self::FallbackFailed
                | Self::InvalidUrl
        )
    }

    /// Returns true for kinds produced by the curation stage
    pub fn is_curation(&self) -> bool {
        matches!(self, Self::ParseError | Self::CollaboratorError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
