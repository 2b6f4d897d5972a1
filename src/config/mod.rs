//! Configuration module for the enricher
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section is optional, so an empty file yields the default configuration.
//!
//! # Example
//!
//! ```no_run
//! use bookmark_enricher::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("enricher.toml")).unwrap();
//! println!("Primary strategy attempts: {}", config.scraper.max_retries);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CurationConfig, EmbeddingConfig, LlmConfig, LocalConfig, SafetyConfig, ScraperConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
