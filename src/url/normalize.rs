use crate::UrlError;
use std::collections::BTreeMap;
use url::Url;

/// Exact query keys that only carry attribution data
const TRACKING_PARAMS: &[&str] = &[
    // Google Analytics / Ads
    "_gl", "_ga", "_gid", "_gat", "ga", "gclid", "gclsrc", "dclid",
    // Facebook
    "fbclid", "fb_source", "fb_action_ids", "fb_action_types",
    // Microsoft, Twitter, LinkedIn, Reddit
    "msclkid", "twclid", "li_fat_id", "trk", "rdt_cid",
    // Ad networks
    "ob_click_id", "taboola",
    // Mailchimp, HubSpot, Matomo/Piwik
    "mc_cid", "mc_eid", "_hsenc", "_hsmi", "pk_campaign", "pk_kwd", "piwik_campaign",
    "piwik_kwd", "mtm_campaign", "mtm_keyword", "mtm_source", "mtm_medium",
    // Generic referrers
    "ref", "ref_src", "ref_url", "cmpid", "ncid", "_bta_tid", "_bta_c", "igshid",
];

/// A URL with its tracking parameters stripped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanedUrl {
    /// The cleaned URL
    pub url: String,
    /// Removed tracking parameters, keyed by name
    pub tracking: BTreeMap<String, String>,
}

impl CleanedUrl {
    pub fn was_modified(&self) -> bool {
        !self.tracking.is_empty()
    }
}

/// Removes tracking query parameters from a URL
///
/// Functional parameters keep their original order, the fragment is kept,
/// and a trailing slash on a non-root path is dropped.
///
/// # Examples
///
/// ```
/// use bookmark_enricher::url::clean_url;
///
/// let cleaned = clean_url("https://example.com/post/?id=7&utm_source=news").unwrap();
/// assert_eq!(cleaned.url, "https://example.com/post?id=7");
/// assert_eq!(cleaned.tracking.get("utm_source").map(String::as_str), Some("news"));
/// ```
pub fn clean_url(url_str: &str) -> Result<CleanedUrl, UrlError> {
    let mut url = parse_http_url(url_str)?;
    let mut tracking = BTreeMap::new();

    if url.query().is_some() {
        let mut kept = Vec::new();
        for (key, value) in url.query_pairs() {
            if is_tracking_param(&key) {
                tracking.insert(key.into_owned(), value.into_owned());
            } else {
                kept.push((key.into_owned(), value.into_owned()));
            }
        }

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Ok(CleanedUrl {
        url: url.to_string(),
        tracking,
    })
}

/// Checks whether a URL carries any tracking query parameter
pub fn has_tracking_params(url_str: &str) -> bool {
    Url::parse(url_str)
        .map(|url| url.query_pairs().any(|(key, _)| is_tracking_param(&key)))
        .unwrap_or(false)
}

/// Builds a key under which equivalent bookmark URLs collide
///
/// # Key Rules
///
/// 1. http and https are folded to https
/// 2. Host is lowercased and a leading `www.` removed
/// 3. Dot segments, duplicate slashes and the trailing slash are removed
/// 4. The fragment is dropped
/// 5. Tracking parameters are dropped and the rest sorted by key
///
/// ```
/// use bookmark_enricher::url::dedup_key;
///
/// let a = dedup_key("http://WWW.Example.com/a/../b/?utm_source=x#top").unwrap();
/// let b = dedup_key("https://example.com/b").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn dedup_key(url_str: &str) -> Result<String, UrlError> {
    let mut url = parse_http_url(url_str)?;

    url.set_scheme("https")
        .map_err(|_| UrlError::Malformed(format!("Cannot rewrite scheme of {}", url_str)))?;

    let host = url.host_str().ok_or(UrlError::MissingDomain)?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    let path = normalize_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    if url.query().is_some() {
        let mut params: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        params.sort();

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url.to_string())
}

fn parse_http_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Removes dot segments, empty segments, and the trailing slash
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
