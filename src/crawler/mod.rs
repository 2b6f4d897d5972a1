//! Crawler module for resilient page acquisition
//!
//! This module contains the content-acquisition logic, including:
//! - Process-wide request pacing
//! - Randomized browser headers
//! - HTTP fetching with classified failures
//! - Article and visible-text extraction strategies
//! - The retrying, multi-strategy scraper that ties them together

mod extract;
mod fetcher;
mod headers;
mod pacer;
mod resilient;

pub use extract::{
    count_words, truncate_chars, ArticleExtractor, ContentExtractor, FetchOutcome,
    VisibleTextExtractor,
};
pub use fetcher::{
    build_fallback_client, build_http_client, classify_status, classify_transport,
    ContentFetcher, FetchFailure, FetchedPage,
};
pub use headers::HeaderProvider;
pub use pacer::RequestPacer;
pub use resilient::{ResilientScraper, ScrapeResult};
