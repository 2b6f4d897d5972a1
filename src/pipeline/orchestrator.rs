//! Pipeline orchestration
//!
//! Runs the archivist, then (unless the URL is local) the curator, merges
//! both into a [`PipelineResult`], and derives the final status. The run is
//! sequential; concurrency comes from callers running several pipelines
//! against one shared orchestrator.

use super::result::{status_for, PipelineResult};
use crate::agents::{Archivist, Curator};
use crate::config::Config;
use crate::crawler::{RequestPacer, ResilientScraper};
use crate::safety::SafetyClassifier;
use crate::services::{Embedder, TextGenerator};
use crate::state::{CurationStatus, ErrorKind, PipelineStatus};
use crate::EnricherError;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

/// Sequences extraction and curation for one URL at a time
pub struct PipelineOrchestrator {
    archivist: Archivist,
    curator: Curator,
}

impl PipelineOrchestrator {
    pub fn new(archivist: Archivist, curator: Curator) -> Self {
        Self { archivist, curator }
    }

    /// Builds the full object graph from configuration
    ///
    /// The collaborators are created once by the caller and shared; the
    /// pacer created here is shared by every run of this orchestrator.
    pub fn from_config(
        config: &Config,
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, EnricherError> {
        let pacer = Arc::new(RequestPacer::new(config.scraper.pacing_interval()));
        let scraper = Arc::new(ResilientScraper::new(&config.scraper, &config.local, pacer)?);
        let classifier = Arc::new(SafetyClassifier::from_config(&config.safety));

        let mut archivist = Archivist::new(scraper, classifier);
        if config.curation.enhance_generic_titles {
            archivist = archivist
                .with_title_generator(Arc::clone(&generator), config.curation.collaborator_timeout());
        }
        let curator = Curator::new(generator, embedder, &config.curation);

        Ok(Self::new(archivist, curator))
    }

    pub fn classifier(&self) -> &Arc<SafetyClassifier> {
        self.archivist.classifier()
    }

    pub async fn run(&self, url: &str, original_title: &str) -> PipelineResult {
        self.run_with_cancel(url, original_title, &CancellationToken::new())
            .await
    }

    /// Runs the pipeline; always returns a complete result
    ///
    /// Internal defects (invariant violations and panics) become a `failed`
    /// result with `unexpected_error`. `processing_time` is recorded on
    /// every path.
    #[instrument(skip_all, fields(url = %url))]
    pub async fn run_with_cancel(
        &self,
        url: &str,
        original_title: &str,
        cancel: &CancellationToken,
    ) -> PipelineResult {
        let start = Instant::now();
        tracing::info!("Processing {}", url);

        // Lives outside the unwind boundary so a defect keeps what was learned
        let mut result = PipelineResult::new(url, original_title);
        let outcome = AssertUnwindSafe(self.execute(url, cancel, &mut result))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::error!("Pipeline error for {}: {}", url, e);
                result.fail_unexpected(e.to_string());
            }
            Err(panic) => {
                let detail = panic_message(panic.as_ref());
                tracing::error!("Pipeline panicked for {}: {}", url, detail);
                result.fail_unexpected(detail);
            }
        }
        result.processing_time = start.elapsed().as_secs_f64();

        tracing::info!(
            status = %result.status,
            scraping = %result.scraping_status,
            curation = %result.curation_status,
            seconds = result.processing_time,
            "Finished {}",
            url
        );
        result
    }

    async fn execute(
        &self,
        url: &str,
        cancel: &CancellationToken,
        result: &mut PipelineResult,
    ) -> Result<(), EnricherError> {
        let archived = self
            .archivist
            .process_with_cancel(url, &result.original_title, cancel)
            .await?;
        result.apply_archivist(&archived);

        if archived.is_local {
            result.finish(PipelineStatus::ManualRequired);
            result.curation_status = CurationStatus::Skipped;
            result.error_type = Some(ErrorKind::LocalUrl);
            return Ok(());
        }

        if archived.scrape.error_kind == Some(ErrorKind::Cancelled) {
            result.finish(PipelineStatus::Failed);
            result.error_type = Some(ErrorKind::Cancelled);
            return Ok(());
        }

        let curated = self
            .curator
            .curate_with_cancel(
                &result.clean_title,
                archived.full_text.as_deref(),
                url,
                cancel,
            )
            .await;
        let curate_ok = curated.success;
        result.apply_curation(curated);

        result.finish(status_for(archived.success, curate_ok));
        Ok(())
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panic: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panic: {}", s)
    } else {
        "panic with non-string payload".to_string()
    }
}
