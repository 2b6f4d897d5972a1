//! Signals derived from a URL alone
//!
//! When no page text is available the curator still knows the URL. This
//! module breaks it into structured signals (domain parts, path segments,
//! category hints) without touching the network.

use crate::state::Category;
use crate::url::split_host;
use url::Url;

/// Keyword hints, matched as substrings of path segments and host labels
const CATEGORY_HINTS: &[(Category, &[&str])] = &[
    (
        Category::Transportation,
        &["bus", "metro", "train", "tren", "transport", "schedule", "horario", "tmb", "renfe"],
    ),
    (
        Category::Education,
        &["course", "curso", "class", "university", "edu", "learning", "tutorial", "coursera"],
    ),
    (
        Category::Programming,
        &["github", "code", "dev", "api", "docs", "python", "javascript", "repo"],
    ),
    (
        Category::News,
        &["news", "noticias", "article", "post", "blog"],
    ),
];

/// Registered domains a generator can be expected to know well
const WELL_KNOWN_DOMAINS: &[&str] = &[
    "google.com",
    "github.com",
    "gitlab.com",
    "wikipedia.org",
    "youtube.com",
    "stackoverflow.com",
    "coursera.org",
    "medium.com",
    "reddit.com",
    "amazon.com",
    "linkedin.com",
    "nytimes.com",
    "bbc.co.uk",
    "rust-lang.org",
    "docs.rs",
    "crates.io",
    "python.org",
    "mozilla.org",
];

/// Structured view of a URL for URL-only curation
#[derive(Debug, Clone, PartialEq)]
pub struct UrlSignals {
    pub url: String,
    /// Registrable label (`github` for `www.github.com`)
    pub domain: String,
    /// Public suffix (`com`, `co.uk`)
    pub suffix: String,
    pub subdomains: Vec<String>,
    pub path_segments: Vec<String>,
    /// Categories hinted at by keywords, without duplicates, in table order
    pub category_hints: Vec<Category>,
    /// The registered domain is on the well-known list
    pub well_known: bool,
}

impl UrlSignals {
    /// Extracts signals from a URL; unparseable input yields empty signals
    pub fn from_url(url: &str) -> Self {
        let parsed = Url::parse(url.trim()).ok();
        let host = parsed
            .as_ref()
            .and_then(|u| u.host_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let parts = split_host(&host);

        let path_segments: Vec<String> = parsed
            .as_ref()
            .and_then(|u| u.path_segments())
            .map(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect()
            })
            .unwrap_or_default();

        let mut haystack: Vec<String> = path_segments.iter().map(|s| s.to_lowercase()).collect();
        haystack.push(parts.domain.clone());
        haystack.extend(parts.subdomains.iter().cloned());

        let category_hints = CATEGORY_HINTS
            .iter()
            .filter(|(_, keywords)| {
                haystack
                    .iter()
                    .any(|item| keywords.iter().any(|kw| item.contains(kw)))
            })
            .map(|(category, _)| *category)
            .collect();

        let registered = parts.registered_domain();
        Self {
            url: url.trim().to_string(),
            well_known: WELL_KNOWN_DOMAINS.contains(&registered.as_str()),
            domain: parts.domain,
            suffix: parts.suffix,
            subdomains: parts.subdomains,
            path_segments,
            category_hints,
        }
    }

    pub fn registered_domain(&self) -> String {
        if self.suffix.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.domain, self.suffix)
        }
    }

    /// Confidence the URL alone supports, used when the generator gives none
    ///
    /// | Signal | Confidence |
    /// |--------|------------|
    /// | well-known domain | 0.9 |
    /// | category hint keywords | 0.7 |
    /// | any path segments | 0.5 |
    /// | nothing | 0.3 |
    pub fn heuristic_confidence(&self) -> f64 {
        if self.well_known {
            0.9
        } else if !self.category_hints.is_empty() {
            0.7
        } else if !self.path_segments.is_empty() {
            0.5
        } else {
            0.3
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_repo() {
        let signals = UrlSignals::from_url("https://github.com/user/awesome-python");

        assert_eq!(signals.domain, "github");
        assert_eq!(signals.suffix, "com");
        assert!(signals.subdomains.is_empty());
        assert_eq!(signals.path_segments, vec!["user", "awesome-python"]);
        assert_eq!(signals.category_hints, vec![Category::Programming]);
        assert!(signals.well_known);
        assert_eq!(signals.heuristic_confidence(), 0.9);
    }

    #[test]
    fn test_transit_schedule() {
        let signals = UrlSignals::from_url("https://www.tmb.cat/es/horarios-metro");

        assert_eq!(signals.subdomains, vec!["www"]);
        assert_eq!(signals.registered_domain(), "tmb.cat");
        assert!(signals.category_hints.contains(&Category::Transportation));
        assert!(!signals.well_known);
        assert_eq!(signals.heuristic_confidence(), 0.7);
    }

    #[test]
    fn test_unknown_domain() {
        let signals = UrlSignals::from_url("https://qzxv.example/");
        assert!(signals.path_segments.is_empty());
        assert!(signals.category_hints.is_empty());
        assert_eq!(signals.heuristic_confidence(), 0.3);

        let signals = UrlSignals::from_url("https://qzxv.example/a/b");
        assert_eq!(signals.heuristic_confidence(), 0.5);
    }

    #[test]
    fn test_unparseable_url() {
        let signals = UrlSignals::from_url("not a url");
        assert!(signals.domain.is_empty());
        assert!(signals.path_segments.is_empty());
    }
}
