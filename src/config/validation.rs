use crate::config::types::{
    Config, CurationConfig, EmbeddingConfig, LlmConfig, LocalConfig, SafetyConfig, ScraperConfig,
};
use crate::ConfigError;
use std::net::IpAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scraper_config(&config.scraper)?;
    validate_local_config(&config.local)?;
    validate_safety_config(&config.safety)?;
    validate_curation_config(&config.curation)?;
    validate_llm_config(&config.llm)?;
    validate_embedding_config(&config.embedding)?;
    Ok(())
}

fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    if config.max_retries < 1 || config.max_retries > 10 {
        return Err(ConfigError::Validation(format!(
            "max_retries must be between 1 and 10, got {}",
            config.max_retries
        )));
    }

    if config.request_timeout < 100 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 100ms, got {}ms",
            config.request_timeout
        )));
    }

    if config.max_redirects > 20 {
        return Err(ConfigError::Validation(format!(
            "max_redirects must be <= 20, got {}",
            config.max_redirects
        )));
    }

    if config.min_content_length < 1 {
        return Err(ConfigError::Validation(
            "min_content_length must be >= 1".to_string(),
        ));
    }

    if config.max_text_length < config.min_content_length {
        return Err(ConfigError::Validation(format!(
            "max_text_length ({}) must be >= min_content_length ({})",
            config.max_text_length, config.min_content_length
        )));
    }

    Ok(())
}

fn validate_local_config(config: &LocalConfig) -> Result<(), ConfigError> {
    for pattern in &config.domains {
        validate_host_pattern(pattern)?;
    }
    Ok(())
}

fn validate_safety_config(config: &SafetyConfig) -> Result<(), ConfigError> {
    if config.nsfw_keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "nsfw_keywords cannot contain empty entries".to_string(),
        ));
    }

    for domain in &config.nsfw_domains {
        if domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "nsfw_domains cannot contain empty entries".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_curation_config(config: &CurationConfig) -> Result<(), ConfigError> {
    if config.text_limit < config.min_text_length {
        return Err(ConfigError::Validation(format!(
            "text_limit ({}) must be >= min_text_length ({})",
            config.text_limit, config.min_text_length
        )));
    }

    if config.collaborator_timeout < 100 {
        return Err(ConfigError::Validation(format!(
            "collaborator_timeout must be >= 100ms, got {}ms",
            config.collaborator_timeout
        )));
    }

    Ok(())
}

fn validate_llm_config(config: &LlmConfig) -> Result<(), ConfigError> {
    validate_endpoint("llm.endpoint", &config.endpoint)?;

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "llm.model cannot be empty".to_string(),
        ));
    }

    if !(0.0..=2.0).contains(&config.temperature) {
        return Err(ConfigError::Validation(format!(
            "llm.temperature must be between 0 and 2, got {}",
            config.temperature
        )));
    }

    Ok(())
}

fn validate_embedding_config(config: &EmbeddingConfig) -> Result<(), ConfigError> {
    validate_endpoint("embedding.endpoint", &config.endpoint)?;

    if config.dimension < 1 {
        return Err(ConfigError::Validation(
            "embedding.dimension must be >= 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_endpoint(name: &str, endpoint: &str) -> Result<(), ConfigError> {
    let url = Url::parse(endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {}: {}", name, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got '{}'",
            name,
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates a host pattern: an IP literal, a host name, or a `*.`-prefixed suffix
fn validate_host_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host pattern cannot be empty".to_string(),
        ));
    }

    if pattern.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    let host = pattern.strip_prefix("*.").unwrap_or(pattern);
    validate_host_string(host)
}

fn validate_host_string(host: &str) -> Result<(), ConfigError> {
    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host cannot be empty".to_string(),
        ));
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.starts_with('-') || host.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot start or end with '.' or '-'",
            host
        )));
    }

    if host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' cannot contain consecutive dots",
            host
        )));
    }

    Ok(())
}
