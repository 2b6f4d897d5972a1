//! URL handling module
//!
//! This module provides registered-domain splitting, host pattern matching,
//! the local-URL policy, and tracking-parameter cleaning for deduplication.

mod domain;
mod matcher;
mod normalize;

use crate::config::LocalConfig;
use std::net::IpAddr;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, registered_domain, split_host, DomainParts};
pub use matcher::{first_match, matches_host_pattern};
pub use normalize::{clean_url, dedup_key, has_tracking_params, CleanedUrl};

/// Decides which URLs are exempt from automated fetching
///
/// A URL is local when its host matches one of the configured host patterns,
/// or, with `block_private_ips`, when the host is a loopback, private,
/// link-local, or unspecified IP literal.
#[derive(Debug, Clone)]
pub struct LocalUrlPolicy {
    patterns: Vec<String>,
    block_private_ips: bool,
}

impl LocalUrlPolicy {
    pub fn new(patterns: Vec<String>, block_private_ips: bool) -> Self {
        Self {
            patterns: patterns.into_iter().map(|p| p.to_lowercase()).collect(),
            block_private_ips,
        }
    }

    pub fn from_config(config: &LocalConfig) -> Self {
        Self::new(config.domains.clone(), config.block_private_ips)
    }

    /// Returns the reason a URL is local, or `None` for fetchable URLs
    ///
    /// Unparseable URLs are not local; the scraper rejects them separately.
    pub fn local_reason(&self, url: &str) -> Option<String> {
        let parsed = Url::parse(url.trim()).ok()?;
        let host = extract_domain(&parsed)?;

        if let Some(pattern) = first_match(&self.patterns, &host) {
            return Some(format!("host '{}' matches local pattern '{}'", host, pattern));
        }

        if self.block_private_ips && is_private_ip(&host) {
            return Some(format!("host '{}' is a private or loopback address", host));
        }

        None
    }

    pub fn is_local(&self, url: &str) -> bool {
        self.local_reason(url).is_some()
    }
}

impl Default for LocalUrlPolicy {
    fn default() -> Self {
        Self::from_config(&LocalConfig::default())
    }
}

fn is_private_ip(host: &str) -> bool {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    match bare.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            ip.is_loopback() || ip.is_private() || ip.is_link_local() || ip.is_unspecified()
        }
        Ok(IpAddr::V6(ip)) => {
            // fc00::/7 unique local, fe80::/10 link local
            let first = ip.segments()[0];
            ip.is_loopback()
                || ip.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80
        }
        Err(_) => false,
    }
}
