//! Lifecycle enums reported in a pipeline result
//!
//! Each enum serializes to the same snake_case string returned by `as_str`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Final status of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// Content was scraped and curated
    Completed,
    /// Scraping failed but URL-only curation produced usable metadata
    CompletedPartial,
    /// Nothing usable was produced
    Failed,
    /// Local URL, needs manual capture
    ManualRequired,
}

impl PipelineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::CompletedPartial => "completed_partial",
            Self::Failed => "failed",
            Self::ManualRequired => "manual_required",
        }
    }

    /// Returns true when the run produced usable metadata
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed | Self::CompletedPartial)
    }

    pub fn all() -> [Self; 4] {
        [
            Self::Completed,
            Self::CompletedPartial,
            Self::Failed,
            Self::ManualRequired,
        ]
    }
}

/// Outcome of the content-acquisition stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrapingStatus {
    Pending,
    Success,
    Failed,
    /// Local URL, never fetched
    Skipped,
}

impl ScrapingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Outcome of the curation stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurationStatus {
    Pending,
    /// Curated from page text
    Success,
    /// Curated from URL signals only
    Fallback,
    Failed,
    /// Local URL, curation not attempted
    Skipped,
}

impl CurationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Fallback => "fallback",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

/// Which acquisition strategy produced the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyUsed {
    /// Single-shot primary extraction
    Primary,
    /// Primary extraction within the retry loop
    PrimaryRetry,
    /// Generic visible-text fallback
    Fallback,
    None,
}

impl StrategyUsed {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::PrimaryRetry => "primary_retry",
            Self::Fallback => "fallback",
            Self::None => "none",
        }
    }
}

/// How the curator reached its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurationMode {
    FullText,
    UrlOnly,
}

impl CurationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullText => "full_text",
            Self::UrlOnly => "url_only",
        }
    }
}

macro_rules! impl_display_via_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

impl_display_via_as_str!(
    PipelineStatus,
    ScrapingStatus,
    CurationStatus,
    StrategyUsed,
    CurationMode
);
