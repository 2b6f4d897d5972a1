//! Multi-strategy content acquisition
//!
//! The resilient scraper owns the question "how do we get text out of this
//! URL". It combines pacing, header rotation, classified fetches, and the
//! extraction strategies into a bounded retry loop:
//!
//! 1. Local/private hosts are rejected without any network call.
//! 2. Strategy A (article extraction) runs up to `max_retries` attempts.
//!    A 403 stops it at once; a 429 backs off `base * attempt` before the
//!    next attempt; timeouts, connection failures, other HTTP errors and
//!    short extractions are retried.
//! 3. Strategy B (visible-text fallback) runs once, only after a 403.
//!
//! Every expected failure ends up in the returned [`ScrapeResult`].

use crate::config::{Config, LocalConfig, ScraperConfig};
use crate::crawler::extract::{
    ArticleExtractor, ContentExtractor, FetchOutcome, VisibleTextExtractor,
};
use crate::crawler::fetcher::{
    build_fallback_client, build_http_client, ContentFetcher, FetchFailure, FetchedPage,
};
use crate::crawler::headers::HeaderProvider;
use crate::crawler::pacer::RequestPacer;
use crate::state::{ErrorKind, StrategyUsed};
use crate::url::{extract_domain, LocalUrlPolicy};
use crate::{until_cancelled, EnricherError};
use reqwest::header::HeaderMap;
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use url::Url;

/// Aggregate outcome of every attempt made for one URL
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScrapeResult {
    pub success: bool,
    pub strategy_used: StrategyUsed,
    pub error_kind: Option<ErrorKind>,
    pub error_detail: Option<String>,
    /// Fetches actually sent, across both strategies
    pub attempts: u32,
    pub domain: Option<String>,
    pub language: Option<String>,
    pub word_count: usize,
    pub text: Option<String>,
    pub title: Option<String>,
    pub html_snippet: Option<String>,
    /// URL after redirects, when a page was fetched
    pub final_url: Option<String>,
}

impl ScrapeResult {
    fn failed(domain: Option<String>, kind: ErrorKind, detail: impl Into<String>, attempts: u32) -> Self {
        Self {
            success: false,
            strategy_used: StrategyUsed::None,
            error_kind: Some(kind),
            error_detail: Some(detail.into()),
            attempts,
            domain,
            language: None,
            word_count: 0,
            text: None,
            title: None,
            html_snippet: None,
            final_url: None,
        }
    }

    fn succeeded(
        domain: Option<String>,
        strategy: StrategyUsed,
        outcome: FetchOutcome,
        attempts: u32,
        final_url: String,
    ) -> Self {
        Self {
            success: true,
            strategy_used: strategy,
            error_kind: None,
            error_detail: None,
            attempts,
            domain,
            language: outcome.language,
            word_count: outcome.word_count,
            text: outcome.text,
            title: outcome.title,
            html_snippet: outcome.html_snippet,
            final_url: Some(final_url),
        }
    }

    /// Returns true when the URL was short-circuited by the local policy
    pub fn is_local(&self) -> bool {
        self.error_kind == Some(ErrorKind::LocalUrl)
    }

    /// Checks the success/failure shape of the result
    ///
    /// A successful result carries non-empty text and a positive word count;
    /// a failed one carries an error kind.
    pub fn check_invariant(&self) -> Result<(), EnricherError> {
        if self.success {
            let has_text = self.text.as_deref().map_or(false, |t| !t.trim().is_empty());
            if !has_text || self.word_count == 0 {
                return Err(EnricherError::Invariant(format!(
                    "successful scrape without text (word_count = {})",
                    self.word_count
                )));
            }
        } else if self.error_kind.is_none() {
            return Err(EnricherError::Invariant(
                "failed scrape without an error kind".to_string(),
            ));
        }
        Ok(())
    }
}

/// The last failure seen by the attempt loop
struct LastFailure {
    kind: ErrorKind,
    detail: String,
}

impl From<FetchFailure> for LastFailure {
    fn from(failure: FetchFailure) -> Self {
        Self {
            kind: failure.kind,
            detail: failure.detail,
        }
    }
}

/// Retrying, multi-strategy scraper
pub struct ResilientScraper {
    config: ScraperConfig,
    local_policy: LocalUrlPolicy,
    pacer: Arc<RequestPacer>,
    headers: HeaderProvider,
    primary_fetcher: ContentFetcher,
    fallback_fetcher: ContentFetcher,
    primary: Box<dyn ContentExtractor>,
    fallback: Box<dyn ContentExtractor>,
}

impl ResilientScraper {
    /// Creates a scraper that paces through the given shared pacer
    ///
    /// # Arguments
    ///
    /// * `config` - Retry, timeout, and extraction limits
    /// * `local` - Local/private host policy
    /// * `pacer` - Process-wide pacer shared with every other scraper
    pub fn new(
        config: &ScraperConfig,
        local: &LocalConfig,
        pacer: Arc<RequestPacer>,
    ) -> Result<Self, EnricherError> {
        let timeout = config.request_timeout();
        Ok(Self {
            config: config.clone(),
            local_policy: LocalUrlPolicy::from_config(local),
            pacer,
            headers: HeaderProvider::new(),
            primary_fetcher: ContentFetcher::new(build_http_client(config)?, timeout),
            fallback_fetcher: ContentFetcher::new(build_fallback_client(config)?, timeout),
            primary: Box::new(ArticleExtractor::new(
                config.min_content_length,
                config.html_snippet_length,
            )),
            fallback: Box::new(VisibleTextExtractor::new(
                config.max_text_length,
                config.html_snippet_length,
            )),
        })
    }

    /// Creates a scraper with its own pacer
    pub fn from_config(config: &Config) -> Result<Self, EnricherError> {
        let pacer = Arc::new(RequestPacer::new(config.scraper.pacing_interval()));
        Self::new(&config.scraper, &config.local, pacer)
    }

    pub fn pacer(&self) -> &Arc<RequestPacer> {
        &self.pacer
    }

    pub fn local_policy(&self) -> &LocalUrlPolicy {
        &self.local_policy
    }

    /// Scrapes a URL; never fails, every outcome is in the result
    pub async fn scrape(&self, url: &str) -> ScrapeResult {
        self.scrape_with_cancel(url, &CancellationToken::new()).await
    }

    /// Scrapes a URL, giving up with `cancelled` as soon as `cancel` fires
    #[instrument(skip_all, fields(url = %url))]
    pub async fn scrape_with_cancel(&self, url: &str, cancel: &CancellationToken) -> ScrapeResult {
        let url = url.trim();

        let parsed = match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
            Ok(parsed) => {
                return ScrapeResult::failed(
                    None,
                    ErrorKind::InvalidUrl,
                    format!("Unsupported scheme: {}", parsed.scheme()),
                    0,
                )
            }
            Err(e) => {
                return ScrapeResult::failed(None, ErrorKind::InvalidUrl, e.to_string(), 0);
            }
        };
        let domain = extract_domain(&parsed);

        if let Some(reason) = self.local_policy.local_reason(url) {
            tracing::info!("Local URL, skipping automated fetch: {} ({})", url, reason);
            return ScrapeResult::failed(domain, ErrorKind::LocalUrl, reason, 0);
        }

        let max_attempts = self.config.max_retries.max(1);
        let mut attempts = 0u32;
        let mut last = LastFailure {
            kind: ErrorKind::UnexpectedError,
            detail: "no attempt made".to_string(),
        };

        // ===== Strategy A: article extraction with retry =====
        for attempt in 1..=max_attempts {
            let headers = self.headers.browser_headers();
            let fetched = match self
                .paced_fetch(&self.primary_fetcher, url, headers, cancel, &mut attempts)
                .await
            {
                Some(fetched) => fetched,
                None => return Self::cancelled(domain, attempts),
            };

            match fetched {
                Ok(page) => {
                    let outcome = self.primary.extract(&page.body);
                    if outcome.success {
                        tracing::info!(
                            attempts,
                            words = outcome.word_count,
                            "Primary extraction succeeded for {}",
                            url
                        );
                        return ScrapeResult::succeeded(
                            domain,
                            StrategyUsed::PrimaryRetry,
                            outcome,
                            attempts,
                            page.final_url,
                        );
                    }
                    last = LastFailure {
                        kind: outcome.error_kind.unwrap_or(ErrorKind::InsufficientContent),
                        detail: outcome.error_detail.unwrap_or_default(),
                    };
                    tracing::warn!(
                        "Attempt {}/{} for {}: {} ({})",
                        attempt,
                        max_attempts,
                        url,
                        last.kind,
                        last.detail
                    );
                }
                Err(failure) => {
                    last = failure.into();
                    tracing::warn!(
                        "Attempt {}/{} for {}: {} ({})",
                        attempt,
                        max_attempts,
                        url,
                        last.kind,
                        last.detail
                    );

                    match last.kind {
                        ErrorKind::BotDetection => {
                            tracing::info!("Bot detection on {}, switching to fallback strategy", url);
                            break;
                        }
                        ErrorKind::InvalidUrl => break,
                        ErrorKind::RateLimited if attempt < max_attempts => {
                            let delay = self.config.rate_limit_delay(attempt);
                            tracing::info!("Rate limited on {}, backing off {:?}", url, delay);
                            if until_cancelled(cancel, tokio::time::sleep(delay)).await.is_none() {
                                return Self::cancelled(domain, attempts);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        // ===== Strategy B: visible-text fallback, only after a 403 =====
        if last.kind == ErrorKind::BotDetection {
            return self.fallback(url, domain, last, cancel, attempts).await;
        }

        tracing::warn!(
            attempts,
            "All attempts failed for {}: {} ({})",
            url,
            last.kind,
            last.detail
        );
        ScrapeResult::failed(domain, last.kind, last.detail, attempts)
    }

    async fn fallback(
        &self,
        url: &str,
        domain: Option<String>,
        blocked: LastFailure,
        cancel: &CancellationToken,
        mut attempts: u32,
    ) -> ScrapeResult {
        let headers = self.headers.minimal_headers();
        let fetched = match self
            .paced_fetch(&self.fallback_fetcher, url, headers, cancel, &mut attempts)
            .await
        {
            Some(fetched) => fetched,
            None => return Self::cancelled(domain, attempts),
        };

        let detail = match fetched {
            Ok(page) => {
                let outcome = self.fallback.extract(&page.body);
                if outcome.success {
                    tracing::info!(
                        attempts,
                        words = outcome.word_count,
                        "Fallback extraction succeeded for {}",
                        url
                    );
                    return ScrapeResult::succeeded(
                        domain,
                        StrategyUsed::Fallback,
                        outcome,
                        attempts,
                        page.final_url,
                    );
                }
                outcome.error_detail.unwrap_or_default()
            }
            Err(failure) => failure.detail,
        };

        tracing::warn!(attempts, "Fallback failed for {}: {}", url, detail);
        ScrapeResult::failed(
            domain,
            ErrorKind::FallbackFailed,
            format!("{}; fallback failed: {}", blocked.detail, detail),
            attempts,
        )
    }

    /// Waits for the pacer, then fetches; `None` when cancelled
    ///
    /// The attempt counter is bumped only once the request is actually sent.
    async fn paced_fetch(
        &self,
        fetcher: &ContentFetcher,
        url: &str,
        headers: HeaderMap,
        cancel: &CancellationToken,
        attempts: &mut u32,
    ) -> Option<Result<FetchedPage, FetchFailure>> {
        until_cancelled(cancel, self.pacer.wait_turn()).await?;
        *attempts += 1;
        until_cancelled(cancel, fetcher.fetch(url, headers)).await
    }

    fn cancelled(domain: Option<String>, attempts: u32) -> ScrapeResult {
        tracing::info!(attempts, "Scrape cancelled");
        ScrapeResult::failed(domain, ErrorKind::Cancelled, "Cancelled by caller", attempts)
    }
}
