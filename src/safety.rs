//! Keyword and domain based safety classification
//!
//! Checks run in a fixed order and the first hit wins:
//!
//! 1. hostname contains a configured unsafe domain
//! 2. a keyword appears as a whole word in the URL
//! 3. a keyword appears as a whole word in the title
//! 4. two or more distinct keywords appear in the first 1000 characters of text
//!
//! Keyword and domain lists may grow at runtime. Nothing is cached between
//! calls, so additions apply to the next `classify`.

use crate::config::SafetyConfig;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};
use url::Url;

/// Characters of body text inspected
const TEXT_SAMPLE_CHARS: usize = 1000;

/// Distinct keyword matches needed before body text is flagged
const TEXT_MATCH_THRESHOLD: usize = 2;

/// Keywords listed in a body-text reason
const MAX_REASON_KEYWORDS: usize = 3;

/// Result of one classification
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ClassificationVerdict {
    pub is_unsafe: bool,
    pub reason: Option<String>,
}

impl ClassificationVerdict {
    pub fn safe() -> Self {
        Self::default()
    }

    pub fn flagged(reason: impl Into<String>) -> Self {
        Self {
            is_unsafe: true,
            reason: Some(reason.into()),
        }
    }
}

/// Classifies a (url, title, text) triple as safe or unsafe
#[derive(Debug)]
pub struct SafetyClassifier {
    enabled: bool,
    keywords: RwLock<Vec<String>>,
    domains: RwLock<Vec<String>>,
}

impl SafetyClassifier {
    pub fn new(keywords: Vec<String>, domains: Vec<String>) -> Self {
        Self {
            enabled: true,
            keywords: RwLock::new(dedup_lowercase(keywords)),
            domains: RwLock::new(dedup_lowercase(domains)),
        }
    }

    pub fn from_config(config: &SafetyConfig) -> Self {
        Self {
            enabled: config.enabled,
            ..Self::new(config.nsfw_keywords.clone(), config.nsfw_domains.clone())
        }
    }

    /// Classifies content; a disabled classifier always answers safe
    pub fn classify(&self, url: &str, title: &str, text: &str) -> ClassificationVerdict {
        if !self.enabled {
            return ClassificationVerdict::safe();
        }

        let url_lower = url.to_lowercase();

        if let Some(domain) = self.domain_hit(&url_lower) {
            tracing::warn!("Unsafe domain detected for {}: {}", url, domain);
            return ClassificationVerdict::flagged(format!("NSFW domain: {}", domain));
        }

        let matcher = KeywordMatcher::new(self.keywords());

        if let Some(keyword) = matcher.matches(&url_lower).into_iter().next() {
            tracing::warn!("Unsafe keyword in URL {}: {}", url, keyword);
            return ClassificationVerdict::flagged(format!("NSFW keyword in URL: {}", keyword));
        }

        let title_hits = matcher.matches(&title.to_lowercase());
        if !title_hits.is_empty() {
            tracing::warn!("Unsafe keywords in title for {}: {:?}", url, title_hits);
            return ClassificationVerdict::flagged(format!(
                "NSFW keywords in title: {}",
                title_hits.join(", ")
            ));
        }

        let sample: String = text.chars().take(TEXT_SAMPLE_CHARS).collect();
        let text_hits = matcher.matches(&sample.to_lowercase());
        if text_hits.len() >= TEXT_MATCH_THRESHOLD {
            tracing::warn!("Unsafe keywords in content for {}: {:?}", url, text_hits);
            let listed: Vec<&str> = text_hits
                .iter()
                .take(MAX_REASON_KEYWORDS)
                .map(String::as_str)
                .collect();
            return ClassificationVerdict::flagged(format!(
                "NSFW keywords in content: {}",
                listed.join(", ")
            ));
        }

        ClassificationVerdict::safe()
    }

    /// Adds a keyword; lowercased, ignored when already present
    pub fn add_keyword(&self, keyword: &str) {
        if push_unique(&self.keywords, keyword) {
            tracing::info!("Added unsafe keyword: {}", keyword);
        }
    }

    /// Adds a domain; lowercased, ignored when already present
    pub fn add_domain(&self, domain: &str) {
        if push_unique(&self.domains, domain) {
            tracing::info!("Added unsafe domain: {}", domain);
        }
    }

    pub fn keywords(&self) -> Vec<String> {
        self.keywords
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn domains(&self) -> Vec<String> {
        self.domains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn domain_hit(&self, url_lower: &str) -> Option<String> {
        let host = Url::parse(url_lower)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| url_lower.to_string());

        self.domains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|domain| host.contains(domain.as_str()))
            .cloned()
    }
}

impl Default for SafetyClassifier {
    fn default() -> Self {
        Self::from_config(&SafetyConfig::default())
    }
}

/// Whole-word matcher over one snapshot of the keyword list
///
/// Built per `classify` call so runtime additions are always seen; the
/// three checks of a call share one compiled alternation.
struct KeywordMatcher {
    keywords: Vec<String>,
    pattern: Option<Regex>,
}

impl KeywordMatcher {
    fn new(keywords: Vec<String>) -> Self {
        let pattern = if keywords.is_empty() {
            None
        } else {
            let alternation: Vec<String> = keywords.iter().map(|k| regex::escape(k)).collect();
            match Regex::new(&format!(r"\b(?:{})\b", alternation.join("|"))) {
                Ok(re) => Some(re),
                Err(e) => {
                    tracing::error!("Failed to build keyword pattern: {}", e);
                    None
                }
            }
        };
        Self { keywords, pattern }
    }

    /// Keywords that occur in `haystack` as whole words, in list order
    fn matches(&self, haystack: &str) -> Vec<String> {
        let Some(pattern) = &self.pattern else {
            return Vec::new();
        };
        if haystack.is_empty() {
            return Vec::new();
        }

        let found: HashSet<&str> = pattern.find_iter(haystack).map(|m| m.as_str()).collect();
        self.keywords
            .iter()
            .filter(|keyword| found.contains(keyword.as_str()))
            .cloned()
            .collect()
    }
}

fn push_unique(list: &RwLock<Vec<String>>, value: &str) -> bool {
    let value = value.trim().to_lowercase();
    if value.is_empty() {
        return false;
    }

    let mut list = list.write().unwrap_or_else(PoisonError::into_inner);
    if list.contains(&value) {
        return false;
    }
    list.push(value);
    true
}

fn dedup_lowercase(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for value in values {
        let value = value.trim().to_lowercase();
        if !value.is_empty() && !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_content() {
        let classifier = SafetyClassifier::default();
        let verdict = classifier.classify(
            "https://doc.rust-lang.org/book/",
            "The Rust Programming Language",
            "Ownership and borrowing explained.",
        );
        assert_eq!(verdict, ClassificationVerdict::safe());
    }

    #[test]
    fn test_domain_match() {
        let verdict = SafetyClassifier::default().classify("https://www.pornhub.com/x", "", "");
        assert!(verdict.is_unsafe);
        assert_eq!(verdict.reason.as_deref(), Some("NSFW domain: pornhub.com"));
    }

    #[test]
    fn test_url_keyword_is_whole_word() {
        let classifier = SafetyClassifier::default();

        let verdict = classifier.classify("https://example.com/casino-bonus", "", "");
        assert_eq!(verdict.reason.as_deref(), Some("NSFW keyword in URL: casino"));

        // "sussex" contains "sex" but not as a word
        let verdict = classifier.classify("https://www.sussex.ac.uk/", "", "");
        assert!(!verdict.is_unsafe);
    }

    #[test]
    fn test_title_keyword() {
        let verdict = SafetyClassifier::default().classify(
            "https://example.com/",
            "Online Gambling Guide",
            "",
        );
        assert!(verdict.is_unsafe);
        assert!(verdict.reason.unwrap().contains("gambling"));
    }

    #[test]
    fn test_single_text_keyword_is_not_enough() {
        let verdict = SafetyClassifier::default().classify(
            "https://example.com/",
            "Travel notes",
            "We walked past a casino on the way to the museum.",
        );
        assert!(!verdict.is_unsafe);
        assert!(verdict.reason.is_none());
    }

    #[test]
    fn test_two_text_keywords_flag() {
        let verdict = SafetyClassifier::default().classify(
            "https://example.com/",
            "Travel notes",
            "The casino floor was busy and gambling went on all night.",
        );
        assert!(verdict.is_unsafe);
        let reason = verdict.reason.unwrap();
        assert!(reason.contains("casino"));
        assert!(reason.contains("gambling"));
    }

    #[test]
    fn test_text_beyond_sample_ignored() {
        let text = format!("{} casino gambling", "a".repeat(1_200));
        let verdict = SafetyClassifier::default().classify("https://example.com/", "", &text);
        assert!(!verdict.is_unsafe);
    }

    #[test]
    fn test_reason_lists_at_most_three() {
        let verdict = SafetyClassifier::default().classify(
            "https://example.com/",
            "",
            "porn sex xxx nude casino",
        );
        let reason = verdict.reason.unwrap();
        assert_eq!(reason, "NSFW keywords in content: porn, sex, xxx");
    }

    #[test]
    fn test_runtime_additions_apply_next_call() {
        let classifier = SafetyClassifier::default();
        assert!(!classifier.classify("https://shady.example/", "", "").is_unsafe);

        classifier.add_domain("Shady.Example");
        classifier.add_domain("shady.example");
        assert_eq!(classifier.domains().len(), 3);
        assert!(classifier.classify("https://shady.example/", "", "").is_unsafe);

        classifier.add_keyword("lottery");
        assert!(classifier
            .classify("https://example.com/lottery", "", "")
            .is_unsafe);
    }

    #[test]
    fn test_keyword_matcher_whole_words_in_list_order() {
        let matcher = KeywordMatcher::new(vec![
            "xxx".to_string(),
            "sex".to_string(),
            "sexy".to_string(),
        ]);

        assert_eq!(matcher.matches("sexy xxx videos"), vec!["xxx", "sexy"]);
        assert_eq!(matcher.matches("sex sex sex"), vec!["sex"]);
        assert!(matcher.matches("university of sussex").is_empty());
        assert!(matcher.matches("").is_empty());
        assert!(KeywordMatcher::new(Vec::new()).matches("xxx").is_empty());
    }

    #[test]
    fn test_disabled_classifier() {
        let config = SafetyConfig {
            enabled: false,
            ..SafetyConfig::default()
        };
        let verdict = SafetyClassifier::from_config(&config).classify(
            "https://www.pornhub.com/",
            "xxx",
            "porn sex",
        );
        assert!(!verdict.is_unsafe);
    }
}
