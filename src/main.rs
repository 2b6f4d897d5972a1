//! Bookmark enricher main entry point
//!
//! This is the command-line interface for the bookmark enrichment pipeline.

use anyhow::Context;
use bookmark_enricher::config::{load_config_with_hash, Config};
use bookmark_enricher::output::{print_statistics, BatchStatistics};
use bookmark_enricher::services::{Embedder, OllamaEmbedder, OllamaGenerator, TextGenerator};
use bookmark_enricher::url::{clean_url, dedup_key};
use bookmark_enricher::{PipelineOrchestrator, PipelineResult};
use clap::Parser;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Bookmark enricher: content acquisition and metadata enrichment for URLs
///
/// Fetches each URL with a resilient multi-strategy scraper, flags unsafe
/// content, and asks a local language model for a summary, tags, a category,
/// and an embedding. Results are printed as one JSON object per line.
#[derive(Parser, Debug)]
#[command(name = "bookmark-enricher")]
#[command(version)]
#[command(about = "Enriches bookmarked URLs with content and metadata", long_about = None)]
struct Cli {
    /// URLs to enrich
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,

    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Original bookmark title to use for every URL
    #[arg(short, long, default_value = "")]
    title: String,

    /// Maximum number of URLs processed at once
    #[arg(short = 'j', long, default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..=64))]
    concurrency: u16,

    /// Print batch statistics to stderr when done
    #[arg(long)]
    stats: bool,

    /// Pretty-print each JSON result
    #[arg(long)]
    pretty: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let urls = prepare_urls(&cli.urls);
    if urls.is_empty() {
        anyhow::bail!("No URLs left to process");
    }

    let generator: Arc<dyn TextGenerator> = Arc::new(OllamaGenerator::from_config(&config.llm));
    let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::from_config(&config.embedding));
    let orchestrator = Arc::new(
        PipelineOrchestrator::from_config(&config, generator, embedder)
            .context("Failed to build the pipeline")?,
    );

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    tracing::info!(
        "Enriching {} URLs (concurrency: {})",
        urls.len(),
        cli.concurrency
    );

    let results = run_batch(orchestrator, urls, &cli.title, cli.concurrency.into(), &cancel, cli.pretty).await?;

    if cli.stats {
        print_statistics(&BatchStatistics::from_results(&results));
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only result records.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bookmark_enricher=info,warn"),
            1 => EnvFilter::new("bookmark_enricher=debug,info"),
            2 => EnvFilter::new("bookmark_enricher=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Strips tracking parameters and drops duplicate inputs
///
/// Inputs that do not parse are kept as given so the pipeline can report
/// them as `invalid_url`.
fn prepare_urls(inputs: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();

    for input in inputs {
        let input = input.trim();
        let url = match clean_url(input) {
            Ok(cleaned) => {
                if cleaned.was_modified() {
                    tracing::debug!("Removed tracking parameters from {}", input);
                }
                cleaned.url
            }
            Err(_) => input.to_string(),
        };

        let key = dedup_key(&url).unwrap_or_else(|_| url.clone());
        if !seen.insert(key) {
            tracing::info!("Skipping duplicate URL: {}", input);
            continue;
        }
        urls.push(url);
    }

    urls
}

fn spawn_interrupt_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling in-flight URLs");
            cancel.cancel();
        }
    });
}

/// Runs every URL through the shared orchestrator and prints results as they finish
async fn run_batch(
    orchestrator: Arc<PipelineOrchestrator>,
    urls: Vec<String>,
    title: &str,
    concurrency: usize,
    cancel: &CancellationToken,
    pretty: bool,
) -> anyhow::Result<Vec<PipelineResult>> {
    let mut runs = stream::iter(urls)
        .map(|url| {
            let orchestrator = Arc::clone(&orchestrator);
            let cancel = cancel.clone();
            let title = title.to_string();
            async move { orchestrator.run_with_cancel(&url, &title, &cancel).await }
        })
        .buffer_unordered(concurrency);

    let mut results = Vec::new();
    while let Some(result) = runs.next().await {
        let line = if pretty {
            serde_json::to_string_pretty(&result)?
        } else {
            serde_json::to_string(&result)?
        };
        println!("{}", line);
        results.push(result);
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prepare_urls_dedups_and_cleans() {
        let inputs = vec![
            "https://www.example.com/post/?utm_source=x".to_string(),
            "http://example.com/post".to_string(),
            "https://other.org/".to_string(),
            "not a url".to_string(),
        ];

        let urls = prepare_urls(&inputs);

        assert_eq!(
            urls,
            vec![
                "https://www.example.com/post".to_string(),
                "https://other.org/".to_string(),
                "not a url".to_string(),
            ]
        );
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from(["bookmark-enricher", "-j", "2", "--stats", "https://example.com/"]);
        assert_eq!(cli.concurrency, 2);
        assert!(cli.stats);
        assert_eq!(cli.urls, vec!["https://example.com/".to_string()]);
        assert!(cli.config.is_none());
    }
}
