//! Randomized browser-like request headers
//!
//! Each attempt draws a fresh User-Agent and Accept-Language so repeated
//! attempts against the same page don't share a fingerprint.

use rand::seq::SliceRandom;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL,
    CONNECTION, DNT, UPGRADE_INSECURE_REQUESTS, USER_AGENT,
};

/// Realistic desktop browser User-Agents
const USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Firefox on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
    // Edge on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0.2210.133",
    // Safari on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
];

const ACCEPT_LANGUAGES: &[&str] = &[
    "en-US,en;q=0.9",
    "en-GB,en;q=0.9,en-US;q=0.8",
    "es-ES,es;q=0.9,en;q=0.8",
    "en-US,en;q=0.8,de;q=0.6",
];

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

/// Produces request headers for each fetch attempt
#[derive(Debug, Clone, Default)]
pub struct HeaderProvider;

impl HeaderProvider {
    pub fn new() -> Self {
        Self
    }

    /// A random User-Agent from the rotation
    pub fn random_user_agent(&self) -> &'static str {
        USER_AGENTS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(USER_AGENTS[0])
    }

    /// Full browser header set with a randomized User-Agent and Accept-Language
    ///
    /// Accept-Encoding is left to the client so compressed bodies are decoded.
    pub fn browser_headers(&self) -> HeaderMap {
        let language = ACCEPT_LANGUAGES
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(ACCEPT_LANGUAGES[0]);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(self.random_user_agent()));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(language));
        headers.insert(DNT, HeaderValue::from_static("1"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        for (name, value) in [
            ("sec-fetch-dest", "document"),
            ("sec-fetch-mode", "navigate"),
            ("sec-fetch-site", "none"),
            ("sec-fetch-user", "?1"),
        ] {
            headers.insert(HeaderName::from_static(name), HeaderValue::from_static(value));
        }
        headers
    }

    /// Minimal header set for the fallback strategy
    pub fn minimal_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(self.random_user_agent()));
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,*/*;q=0.8"));
        headers
    }
}
