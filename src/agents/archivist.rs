//! Extraction agent
//!
//! Wraps the resilient scraper and the safety classifier. Decides the
//! local-URL short circuit, cleans the title, and, when the page scraped
//! fine but its title is still generic, asks the generator for a better one.

use super::call_collaborator;
use super::prompt::title_prompt;
use super::title::{clean_title, is_generic_title, sanitize_generated_title};
use crate::crawler::{truncate_chars, ResilientScraper, ScrapeResult};
use crate::safety::{ClassificationVerdict, SafetyClassifier};
use crate::services::{GenerationRequest, TextGenerator};
use crate::state::ScrapingStatus;
use crate::EnricherError;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Characters of page text shown to the generator when retitling
const TITLE_SAMPLE_CHARS: usize = 1000;
const TITLE_MAX_TOKENS: u32 = 100;

/// Everything the archivist learned about a URL
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivistOutcome {
    /// Page text was acquired
    pub success: bool,
    pub is_local: bool,
    pub clean_title: String,
    pub full_text: Option<String>,
    pub verdict: ClassificationVerdict,
    pub scraping_status: ScrapingStatus,
    pub scrape: ScrapeResult,
    pub error: Option<String>,
}

/// Acquires, titles and vets content for one URL
pub struct Archivist {
    scraper: Arc<ResilientScraper>,
    classifier: Arc<SafetyClassifier>,
    title_generator: Option<Arc<dyn TextGenerator>>,
    timeout: Duration,
}

impl Archivist {
    pub fn new(scraper: Arc<ResilientScraper>, classifier: Arc<SafetyClassifier>) -> Self {
        Self {
            scraper,
            classifier,
            title_generator: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Enables generic-title enhancement through `generator`
    pub fn with_title_generator(mut self, generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        self.title_generator = Some(generator);
        self.timeout = timeout;
        self
    }

    pub fn classifier(&self) -> &Arc<SafetyClassifier> {
        &self.classifier
    }

    pub async fn process(&self, url: &str, original_title: &str) -> Result<ArchivistOutcome, EnricherError> {
        self.process_with_cancel(url, original_title, &CancellationToken::new())
            .await
    }

    /// Processes a URL
    ///
    /// # Returns
    ///
    /// * `Ok(ArchivistOutcome)` - every expected outcome, including failed scrapes
    /// * `Err(EnricherError::Invariant)` - the scraper returned an inconsistent result
    #[instrument(skip_all, fields(url = %url))]
    pub async fn process_with_cancel(
        &self,
        url: &str,
        original_title: &str,
        cancel: &CancellationToken,
    ) -> Result<ArchivistOutcome, EnricherError> {
        let scrape = self.scraper.scrape_with_cancel(url, cancel).await;
        scrape.check_invariant()?;

        let domain = scrape.domain.clone();

        if scrape.is_local() {
            tracing::warn!("Local URL detected: {}", url);
            let title = clean_title(original_title, domain.as_deref());
            return Ok(ArchivistOutcome {
                success: false,
                is_local: true,
                verdict: self.classifier.classify(url, &title, ""),
                clean_title: title,
                full_text: None,
                scraping_status: ScrapingStatus::Skipped,
                error: scrape.error_detail.clone(),
                scrape,
            });
        }

        if !scrape.success {
            tracing::warn!(
                "Scraping failed for {} (type: {:?}, attempts: {})",
                url,
                scrape.error_kind,
                scrape.attempts
            );
            let title = clean_title(original_title, domain.as_deref());
            return Ok(ArchivistOutcome {
                success: false,
                is_local: false,
                verdict: self.classify(url, &title, ""),
                clean_title: title,
                full_text: None,
                scraping_status: ScrapingStatus::Failed,
                error: scrape.error_detail.clone(),
                scrape,
            });
        }

        let text = scrape.text.clone().unwrap_or_default();
        let source_title = scrape
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(original_title);
        let mut title = clean_title(source_title, domain.as_deref());

        let verdict = self.classify(url, &title, &text);

        if is_generic_title(&title) {
            if let Some(better) = self.enhance_title(&title, &text, cancel).await {
                tracing::info!("Enhanced generic title for {}: {}", url, better);
                title = better;
            }
        }

        tracing::info!(
            words = scrape.word_count,
            strategy = %scrape.strategy_used,
            "Archived {}",
            url
        );

        Ok(ArchivistOutcome {
            success: true,
            is_local: false,
            clean_title: title,
            full_text: Some(text),
            verdict,
            scraping_status: ScrapingStatus::Success,
            error: None,
            scrape,
        })
    }

    fn classify(&self, url: &str, title: &str, text: &str) -> ClassificationVerdict {
        let verdict = self.classifier.classify(url, title, text);
        if verdict.is_unsafe {
            tracing::warn!("Unsafe content flagged for {}: {:?}", url, verdict.reason);
        }
        verdict
    }

    /// Asks the generator for a descriptive title; failures are logged and ignored
    async fn enhance_title(&self, title: &str, text: &str, cancel: &CancellationToken) -> Option<String> {
        let generator = self.title_generator.as_ref()?;
        let sample = truncate_chars(text, TITLE_SAMPLE_CHARS);
        let request = GenerationRequest::new(title_prompt(title, &sample)).with_max_tokens(TITLE_MAX_TOKENS);

        match call_collaborator("Title generator", self.timeout, cancel, generator.generate(&request)).await {
            Ok(raw) => sanitize_generated_title(&raw),
            Err(failure) => {
                tracing::warn!("Title enhancement failed: {}", failure.detail);
                None
            }
        }
    }
}
