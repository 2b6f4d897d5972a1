use std::net::IpAddr;
use url::Url;

/// Public suffixes made of more than one label
///
/// Anything not listed here is treated as a single-label suffix (`com`, `cat`, `io`, ...).
const MULTI_LABEL_SUFFIXES: &[&str] = &[
    "co.uk", "org.uk", "ac.uk", "gov.uk", "me.uk", "ltd.uk", "plc.uk",
    "com.au", "net.au", "org.au", "edu.au", "gov.au",
    "co.nz", "org.nz", "govt.nz",
    "co.jp", "ne.jp", "or.jp", "ac.jp",
    "com.br", "org.br", "gov.br",
    "com.mx", "org.mx", "gob.mx",
    "com.ar", "gob.ar",
    "com.es", "org.es", "gob.es", "edu.es",
    "com.co", "gov.co",
    "co.in", "org.in", "gov.in",
    "com.cn", "org.cn",
    "com.tr", "co.za", "com.sg", "com.hk", "co.kr",
    "github.io", "gitlab.io", "herokuapp.com", "blogspot.com",
];

/// A host split into subdomains, registrable label, and public suffix
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainParts {
    /// Labels left of the registrable label, outermost first (e.g., `["www", "blog"]`)
    pub subdomains: Vec<String>,
    /// The registrable label (e.g., `github` for `www.github.com`)
    pub domain: String,
    /// The public suffix (e.g., `com`, `co.uk`); empty for IPs and single-label hosts
    pub suffix: String,
}

impl DomainParts {
    /// Registered domain: `domain.suffix`, or just the domain when there is no suffix
    pub fn registered_domain(&self) -> String {
        if self.suffix.is_empty() {
            self.domain.clone()
        } else {
            format!("{}.{}", self.domain, self.suffix)
        }
    }
}

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use bookmark_enricher::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Splits a host into subdomains, registrable label, and suffix
///
/// IP literals and single-label hosts (`localhost`) come back whole in `domain`.
pub fn split_host(host: &str) -> DomainParts {
    let host = host.trim_end_matches('.').to_lowercase();
    let bare = host.trim_start_matches('[').trim_end_matches(']');

    if bare.parse::<IpAddr>().is_ok() || !host.contains('.') {
        return DomainParts {
            subdomains: Vec::new(),
            domain: host,
            suffix: String::new(),
        };
    }

    let labels: Vec<&str> = host.split('.').collect();
    let suffix_len = MULTI_LABEL_SUFFIXES
        .iter()
        .find(|suffix| host.ends_with(&format!(".{}", suffix)))
        .map(|suffix| suffix.split('.').count())
        .unwrap_or(1);

    if labels.len() <= suffix_len {
        // The whole host is a public suffix
        return DomainParts {
            subdomains: Vec::new(),
            domain: host.clone(),
            suffix: String::new(),
        };
    }

    let domain_index = labels.len() - suffix_len - 1;
    DomainParts {
        subdomains: labels[..domain_index].iter().map(|s| s.to_string()).collect(),
        domain: labels[domain_index].to_string(),
        suffix: labels[domain_index + 1..].join("."),
    }
}

/// Registered domain of a URL string (e.g., `github.com` for `https://www.github.com/x`)
pub fn registered_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = extract_domain(&parsed)?;
    Some(split_host(&host).registered_domain())
}
