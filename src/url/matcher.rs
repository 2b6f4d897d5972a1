use std::net::IpAddr;

/// Checks if a host matches a configured host pattern
///
/// Patterns take three forms:
/// 1. IP literal: "127.0.0.1" matches that address only (bracketed IPv6 hosts are accepted)
/// 2. Exact host: "localhost" matches only "localhost"
/// 3. Suffix: "*.local" matches "local" itself and any host ending in ".local"
///
/// Comparison is case-insensitive.
///
/// # Examples
///
/// ```
/// use bookmark_enricher::url::matches_host_pattern;
///
/// assert!(matches_host_pattern("localhost", "LOCALHOST"));
/// assert!(matches_host_pattern("*.test", "mysite.test"));
/// assert!(!matches_host_pattern("*.test", "contest.com"));
/// assert!(matches_host_pattern("::1", "[::1]"));
/// ```
pub fn matches_host_pattern(pattern: &str, host: &str) -> bool {
    let host = host.trim_end_matches('.').to_lowercase();
    let pattern = pattern.to_lowercase();

    if let Ok(pattern_ip) = pattern.parse::<IpAddr>() {
        let bare = host.trim_start_matches('[').trim_end_matches(']');
        return bare.parse::<IpAddr>().map_or(false, |ip| ip == pattern_ip);
    }

    match pattern.strip_prefix("*.") {
        Some(base) => host == base || host.ends_with(&format!(".{}", base)),
        None => host == pattern,
    }
}

/// Returns the first pattern in `patterns` that matches `host`
pub fn first_match<'a>(patterns: &'a [String], host: &str) -> Option<&'a str> {
    patterns
        .iter()
        .find(|pattern| matches_host_pattern(pattern, host))
        .map(String::as_str)
}
