//! HTTP fetcher implementation
//!
//! This module handles single HTTP GETs for the scraper, including:
//! - Building HTTP clients with timeout and redirect limits
//! - Classifying the HTTP/transport outcome into the error taxonomy
//!
//! Retrying is not done here; the resilient scraper decides what to do with
//! each classified failure.

use crate::config::ScraperConfig;
use crate::state::ErrorKind;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, StatusCode};
use std::time::Duration;

/// Upper bound for the TCP/TLS connect phase
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Content-Type header value
    pub content_type: Option<String>,
    /// Page body
    pub body: String,
}

/// A classified fetch failure
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub kind: ErrorKind,
    pub detail: String,
    /// HTTP status when the failure came from a response
    pub status_code: Option<u16>,
}

impl FetchFailure {
    fn from_status(status: StatusCode, kind: ErrorKind, url: &str) -> Self {
        let detail = match kind {
            ErrorKind::BotDetection => format!("403 Forbidden - bot detection: {}", url),
            ErrorKind::RateLimited => format!("429 Too Many Requests: {}", url),
            _ => format!("HTTP {}", status.as_u16()),
        };
        Self {
            kind,
            detail,
            status_code: Some(status.as_u16()),
        }
    }

    fn from_transport(error: &reqwest::Error, timeout: Duration) -> Self {
        let kind = classify_transport(error);
        let detail = match kind {
            ErrorKind::Timeout => format!("Timed out after {:?}", timeout),
            ErrorKind::ConnectionRefused => format!("Could not connect to server: {}", error),
            _ => error.to_string(),
        };
        Self {
            kind,
            detail,
            status_code: None,
        }
    }
}

/// Builds the client used by the primary strategy
///
/// # Arguments
///
/// * `config` - The scraper configuration (timeout and redirect cap)
pub fn build_http_client(config: &ScraperConfig) -> Result<Client, reqwest::Error> {
    let timeout = config.request_timeout();

    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the plainer client used by the fallback strategy
///
/// Same timeout and redirect cap, no brotli negotiation.
pub fn build_fallback_client(config: &ScraperConfig) -> Result<Client, reqwest::Error> {
    let timeout = config.request_timeout();

    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .redirect(Policy::limited(config.max_redirects))
        .gzip(true)
        .build()
}

/// Maps a response status onto the error taxonomy
///
/// | Status | Kind |
/// |--------|------|
/// | 2xx | None (success) |
/// | 403 | `bot_detection` |
/// | 429 | `rate_limited` |
/// | any other | `http_error` |
pub fn classify_status(status: StatusCode) -> Option<ErrorKind> {
    if status.is_success() {
        None
    } else if status == StatusCode::FORBIDDEN {
        Some(ErrorKind::BotDetection)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Some(ErrorKind::RateLimited)
    } else {
        Some(ErrorKind::HttpError)
    }
}

/// Maps a transport error onto the error taxonomy
pub fn classify_transport(error: &reqwest::Error) -> ErrorKind {
    if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.is_connect() {
        ErrorKind::ConnectionRefused
    } else if error.is_redirect() || error.is_status() {
        ErrorKind::HttpError
    } else if error.is_builder() {
        ErrorKind::InvalidUrl
    } else {
        ErrorKind::UnexpectedError
    }
}

/// Performs one GET and classifies its outcome
#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: Client,
    timeout: Duration,
}

impl ContentFetcher {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// Fetches a URL with the given headers
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - 2xx response with its body
    /// * `Err(FetchFailure)` - classified status or transport failure
    pub async fn fetch(&self, url: &str, headers: HeaderMap) -> Result<FetchedPage, FetchFailure> {
        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| FetchFailure::from_transport(&e, self.timeout))?;

        let status = response.status();
        if let Some(kind) = classify_status(status) {
            return Err(FetchFailure::from_status(status, kind, url));
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| FetchFailure::from_transport(&e, self.timeout))?;

        Ok(FetchedPage {
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        })
    }
}
