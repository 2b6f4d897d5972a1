//! Statistics over a batch of pipeline results
//!
//! This module aggregates finished [`PipelineResult`]s into counts and
//! averages, and prints them in the same plain layout the CLI uses.

use crate::pipeline::PipelineResult;
use crate::state::{CurationMode, ErrorKind, PipelineStatus, StrategyUsed};
use serde::Serialize;
use std::collections::HashMap;

/// Batch statistics summary
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStatistics {
    /// Total number of URLs processed
    pub total: u64,

    /// Count of results by final status
    pub by_status: HashMap<PipelineStatus, u64>,

    /// Count of curated results by mode
    pub by_curation_mode: HashMap<CurationMode, u64>,

    /// Count of successful scrapes by strategy
    pub by_strategy: HashMap<StrategyUsed, u64>,

    /// Scraping failures by kind
    pub scraping_errors: HashMap<ErrorKind, u64>,

    /// Results flagged unsafe
    pub unsafe_count: u64,

    /// Local URLs set aside for manual handling
    pub local_count: u64,

    #[serde(skip)]
    confidence_sum: f64,
    #[serde(skip)]
    confidence_samples: u64,
    #[serde(skip)]
    time_sum: f64,
}

impl BatchStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds statistics from a finished batch
    pub fn from_results<'a, I>(results: I) -> Self
    where
        I: IntoIterator<Item = &'a PipelineResult>,
    {
        let mut stats = Self::new();
        for result in results {
            stats.record(result);
        }
        stats
    }

    /// Adds one result
    pub fn record(&mut self, result: &PipelineResult) {
        self.total += 1;
        *self.by_status.entry(result.status).or_insert(0) += 1;

        if let Some(mode) = result.curation_mode {
            *self.by_curation_mode.entry(mode).or_insert(0) += 1;
        }
        if result.scraping_strategy != StrategyUsed::None {
            *self.by_strategy.entry(result.scraping_strategy).or_insert(0) += 1;
        }
        if let Some(kind) = result.scraping_error_type {
            *self.scraping_errors.entry(kind).or_insert(0) += 1;
        }
        if result.is_nsfw {
            self.unsafe_count += 1;
        }
        if result.is_local {
            self.local_count += 1;
        }
        if result.success {
            self.confidence_sum += result.confidence_score;
            self.confidence_samples += 1;
        }
        self.time_sum += result.processing_time;
    }

    pub fn count(&self, status: PipelineStatus) -> u64 {
        self.by_status.get(&status).copied().unwrap_or(0)
    }

    /// Results that ended `completed` or `completed_partial`
    pub fn succeeded(&self) -> u64 {
        PipelineStatus::all()
            .iter()
            .filter(|s| s.is_success())
            .map(|s| self.count(*s))
            .sum()
    }

    /// Mean confidence over successful results
    pub fn average_confidence(&self) -> Option<f64> {
        if self.confidence_samples == 0 {
            None
        } else {
            Some(self.confidence_sum / self.confidence_samples as f64)
        }
    }

    /// Mean processing time in seconds
    pub fn average_processing_time(&self) -> Option<f64> {
        if self.total == 0 {
            None
        } else {
            Some(self.time_sum / self.total as f64)
        }
    }
}

fn percentage(count: u64, total: u64) -> f64 {
    if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    }
}

/// Prints statistics to stderr in a formatted manner
///
/// Stdout is reserved for result records.
pub fn print_statistics(stats: &BatchStatistics) {
    eprintln!("=== Enrichment Statistics ===\n");

    eprintln!("Overview:");
    eprintln!("  URLs processed: {}", stats.total);
    eprintln!("  Flagged unsafe: {}", stats.unsafe_count);
    eprintln!("  Local (manual): {}", stats.local_count);
    eprintln!();

    eprintln!("Results by Status:");
    for status in PipelineStatus::all() {
        let count = stats.count(status);
        eprintln!(
            "  {}: {} ({:.1}%)",
            status,
            count,
            percentage(count, stats.total)
        );
    }
    eprintln!();

    if !stats.by_curation_mode.is_empty() {
        eprintln!("Curation Modes:");
        let mut modes: Vec<_> = stats.by_curation_mode.iter().collect();
        modes.sort_by(|a, b| b.1.cmp(a.1));
        for (mode, count) in modes {
            eprintln!("  {}: {}", mode, count);
        }
        eprintln!();
    }

    if !stats.by_strategy.is_empty() {
        eprintln!("Scraping Strategies:");
        let mut strategies: Vec<_> = stats.by_strategy.iter().collect();
        strategies.sort_by(|a, b| b.1.cmp(a.1));
        for (strategy, count) in strategies {
            eprintln!("  {}: {}", strategy, count);
        }
        eprintln!();
    }

    if !stats.scraping_errors.is_empty() {
        eprintln!("Scraping Errors:");
        let mut errors: Vec<_> = stats.scraping_errors.iter().collect();
        errors.sort_by(|a, b| b.1.cmp(a.1));
        for (kind, count) in errors {
            eprintln!("  {}: {}", kind, count);
        }
        eprintln!();
    }

    if let Some(confidence) = stats.average_confidence() {
        eprintln!("Average confidence: {:.2}", confidence);
    }
    if let Some(seconds) = stats.average_processing_time() {
        eprintln!("Average processing time: {:.2}s", seconds);
    }

    let succeeded = stats.succeeded();
    eprintln!(
        "Success Rate: {:.1}% ({} / {} URLs enriched)",
        percentage(succeeded, stats.total),
        succeeded,
        stats.total
    );
}
