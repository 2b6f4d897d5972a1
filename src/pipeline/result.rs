//! The pipeline's external result and its status decision table

use crate::agents::{ArchivistOutcome, CurationOutcome};
use crate::state::{
    Category, CurationMode, CurationStatus, ErrorKind, PipelineStatus, ScrapingStatus,
    StrategyUsed,
};
use serde::Serialize;

/// Final status for a non-local run
///
/// | scraping | curation | status |
/// |----------|----------|--------|
/// | success | success | `completed` |
/// | failure | success | `completed_partial` |
/// | any | failure | `failed` |
///
/// Local URLs never reach this table; they are `manual_required`.
pub fn status_for(scrape_ok: bool, curate_ok: bool) -> PipelineStatus {
    match (scrape_ok, curate_ok) {
        (true, true) => PipelineStatus::Completed,
        (false, true) => PipelineStatus::CompletedPartial,
        (_, false) => PipelineStatus::Failed,
    }
}

/// Everything known about one URL after a pipeline run
///
/// Field names are the contract consumed by storage and API layers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineResult {
    pub url: String,
    pub original_title: String,
    pub success: bool,
    pub status: PipelineStatus,
    pub clean_title: String,
    pub summary: Option<String>,
    pub full_text: Option<String>,
    pub tags: Vec<String>,
    pub category: Option<Category>,
    pub is_nsfw: bool,
    pub nsfw_reason: Option<String>,
    pub is_local: bool,
    pub domain: Option<String>,
    pub language: Option<String>,
    pub word_count: usize,
    pub embedding: Option<Vec<f32>>,
    pub scraping_status: ScrapingStatus,
    pub scraping_strategy: StrategyUsed,
    pub scraping_error_type: Option<ErrorKind>,
    pub scraping_attempts: u32,
    pub curation_status: CurationStatus,
    pub curation_mode: Option<CurationMode>,
    pub confidence_score: f64,
    pub error: Option<String>,
    /// Why the run ended without metadata, when it did
    pub error_type: Option<ErrorKind>,
    /// Seconds, measured around the whole run
    pub processing_time: f64,
}

impl PipelineResult {
    /// A fresh result for a run that has not done anything yet
    pub fn new(url: &str, original_title: &str) -> Self {
        Self {
            url: url.to_string(),
            original_title: original_title.to_string(),
            success: false,
            status: PipelineStatus::Failed,
            clean_title: original_title.to_string(),
            summary: None,
            full_text: None,
            tags: Vec::new(),
            category: None,
            is_nsfw: false,
            nsfw_reason: None,
            is_local: false,
            domain: None,
            language: None,
            word_count: 0,
            embedding: None,
            scraping_status: ScrapingStatus::Pending,
            scraping_strategy: StrategyUsed::None,
            scraping_error_type: None,
            scraping_attempts: 0,
            curation_status: CurationStatus::Pending,
            curation_mode: None,
            confidence_score: 0.0,
            error: None,
            error_type: None,
            processing_time: 0.0,
        }
    }

    /// Marks the run failed by an internal defect
    ///
    /// Whatever earlier stages already recorded, including the safety
    /// verdict, is kept.
    pub fn fail_unexpected(&mut self, detail: impl Into<String>) {
        self.finish(PipelineStatus::Failed);
        self.error = Some(detail.into());
        self.error_type = Some(ErrorKind::UnexpectedError);
    }

    /// Copies the extraction stage's findings into the result
    pub fn apply_archivist(&mut self, archived: &ArchivistOutcome) {
        let scrape = &archived.scrape;
        self.clean_title = archived.clean_title.clone();
        self.full_text = archived.full_text.clone();
        self.is_nsfw = archived.verdict.is_unsafe;
        self.nsfw_reason = archived.verdict.reason.clone();
        self.is_local = archived.is_local;
        self.domain = scrape.domain.clone();
        self.language = scrape.language.clone();
        self.word_count = scrape.word_count;
        self.scraping_status = archived.scraping_status;
        self.scraping_strategy = scrape.strategy_used;
        self.scraping_error_type = scrape.error_kind;
        self.scraping_attempts = scrape.attempts;
        self.error = archived.error.clone();
    }

    /// Copies the curation stage's findings into the result
    pub fn apply_curation(&mut self, curated: CurationOutcome) {
        self.curation_status = curated.status;
        self.curation_mode = Some(curated.mode);
        self.confidence_score = curated.confidence;
        self.summary = curated.summary;
        self.tags = curated.tags.into_iter().collect();
        self.category = curated.category;
        self.embedding = curated.embedding;
        if curated.error.is_some() {
            self.error = curated.error;
            self.error_type = curated.error_kind;
        }
    }

    /// Sets the final status and the success flag derived from it
    pub fn finish(&mut self, status: PipelineStatus) {
        self.status = status;
        self.success = status.is_success();
        if self.success {
            self.error_type = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        assert_eq!(status_for(true, true), PipelineStatus::Completed);
        assert_eq!(status_for(false, true), PipelineStatus::CompletedPartial);
        assert_eq!(status_for(true, false), PipelineStatus::Failed);
        assert_eq!(status_for(false, false), PipelineStatus::Failed);
    }

    #[test]
    fn test_finish_sets_success() {
        let mut result = PipelineResult::new("https://example.com/", "Example");
        result.error_type = Some(ErrorKind::Timeout);

        result.finish(PipelineStatus::CompletedPartial);
        assert!(result.success);
        assert_eq!(result.error_type, None);

        result.finish(PipelineStatus::ManualRequired);
        assert!(!result.success);
    }

    #[test]
    fn test_fail_unexpected_keeps_recorded_fields() {
        let mut result = PipelineResult::new("https://example.com/", "Example");
        result.is_nsfw = true;
        result.nsfw_reason = Some("NSFW domain: example.com".to_string());
        result.scraping_status = ScrapingStatus::Success;
        result.finish(PipelineStatus::Completed);

        result.fail_unexpected("invariant broken");

        assert_eq!(result.status, PipelineStatus::Failed);
        assert!(!result.success);
        assert_eq!(result.error_type, Some(ErrorKind::UnexpectedError));
        assert_eq!(result.error.as_deref(), Some("invariant broken"));
        assert!(result.is_nsfw);
        assert!(result.nsfw_reason.is_some());
        assert_eq!(result.scraping_status, ScrapingStatus::Success);
    }

    #[test]
    fn test_serialized_field_names() {
        let mut result = PipelineResult::new("https://example.com/", "Example");
        result.fail_unexpected("boom");
        let json = serde_json::to_value(&result).unwrap();

        for field in [
            "success",
            "status",
            "clean_title",
            "summary",
            "full_text",
            "tags",
            "category",
            "is_nsfw",
            "nsfw_reason",
            "is_local",
            "domain",
            "language",
            "word_count",
            "embedding",
            "scraping_status",
            "scraping_strategy",
            "scraping_error_type",
            "scraping_attempts",
            "curation_status",
            "curation_mode",
            "confidence_score",
            "error",
            "processing_time",
        ] {
            assert!(json.get(field).is_some(), "missing {}", field);
        }
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error_type"], "unexpected_error");
        assert_eq!(json["scraping_strategy"], "none");
        assert!(json["embedding"].is_null());
    }
}
