//! Title normalization
//!
//! Bookmarks often carry titles like "Home" or "Site Name | Section | Page".
//! These helpers turn them into something descriptive using the page domain.

use crate::url::split_host;

/// Titles that say nothing about the page
const GENERIC_TITLES: &[&str] = &[
    "home",
    "index",
    "welcome",
    "inicio",
    "página principal",
    "main page",
    "default",
    "untitled",
    "new tab",
    "homepage",
];

/// Words that mark a title as generic wherever they appear
const GENERIC_WORDS: &[&str] = &["home", "index", "welcome", "homepage"];

/// Phrases that mark a title as generic wherever they appear
const GENERIC_PHRASES: &[&str] = &["main page", "página principal"];

/// Separators between site name and page name
const SEPARATORS: &[&str] = &["|", " - ", " — ", " – "];

/// Longest title accepted from the generator
const MAX_ENHANCED_TITLE: usize = 100;

/// Cleans a bookmark or page title
///
/// # Arguments
///
/// * `original` - Title as scraped or as supplied by the caller
/// * `domain` - Host of the page, used to name generic or empty titles
///
/// # Returns
///
/// * `"<Domain> - Home Page"` for generic titles when a domain is known
/// * The title-cased domain label for empty titles (or `"Unknown Title"`)
/// * Otherwise the longest separator-delimited segment of the title
pub fn clean_title(original: &str, domain: Option<&str>) -> String {
    let trimmed = original.trim();
    let label = domain.map(domain_label).filter(|l| !l.is_empty());

    if GENERIC_TITLES.contains(&trimmed.to_lowercase().as_str()) {
        if let Some(label) = &label {
            return format!("{} - Home Page", label);
        }
    }

    if trimmed.is_empty() {
        return label.unwrap_or_else(|| "Unknown Title".to_string());
    }

    let mut title = trimmed.to_string();
    for separator in SEPARATORS {
        if title.contains(separator) {
            title = title
                .split(separator)
                .map(str::trim)
                .max_by_key(|part| part.chars().count())
                .unwrap_or_default()
                .to_string();
        }
    }
    title
}

/// Returns true when a title still says nothing useful about the page
///
/// Matches the generic words and phrases anywhere in the title, and titles
/// that are nothing but a bare `name.com`/`.net`/`.org` domain.
pub fn is_generic_title(title: &str) -> bool {
    let lower = title.trim().to_lowercase();
    if lower.is_empty() {
        return true;
    }

    if GENERIC_PHRASES.iter().any(|phrase| lower.contains(phrase)) {
        return true;
    }

    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if words.iter().any(|word| GENERIC_WORDS.contains(word)) {
        return true;
    }

    is_bare_domain(&lower)
}

/// Title-cased registrable label of a host: `www.my-site.com` -> `My Site`
pub fn domain_label(host: &str) -> String {
    let label = split_host(host).domain.replace(['-', '_'], " ");
    title_case(&label)
}

/// Tidies a generated title; `None` when nothing usable is left
pub fn sanitize_generated_title(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let title = line
        .trim_start_matches(|c: char| c == '#' || c.is_whitespace())
        .trim_matches(|c: char| c == '"' || c == '\'' || c == '*')
        .trim();
    if title.is_empty() {
        return None;
    }

    if title.chars().count() > MAX_ENHANCED_TITLE {
        let cut: String = title.chars().take(MAX_ENHANCED_TITLE - 3).collect();
        return Some(format!("{}...", cut));
    }
    Some(title.to_string())
}

fn is_bare_domain(lower: &str) -> bool {
    let Some((name, rest)) = lower.split_once('.') else {
        return false;
    };
    let tld: String = rest.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && matches!(tld.as_str(), "com" | "net" | "org")
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generic_title_uses_domain() {
        assert_eq!(clean_title("Home", Some("www.github.com")), "Github - Home Page");
        assert_eq!(clean_title("  INDEX ", Some("my-site.co.uk")), "My Site - Home Page");
        assert_eq!(clean_title("Página principal", Some("tmb.cat")), "Tmb - Home Page");
    }

    #[test]
    fn test_generic_title_without_domain_is_kept() {
        assert_eq!(clean_title("Home", None), "Home");
    }

    #[test]
    fn test_empty_title() {
        assert_eq!(clean_title("   ", Some("docs.rs")), "Docs");
        assert_eq!(clean_title("", None), "Unknown Title");
    }

    #[test]
    fn test_separators_keep_longest_part() {
        assert_eq!(
            clean_title("GitHub | Where the world builds software", None),
            "Where the world builds software"
        );
        assert_eq!(
            clean_title("Understanding Ownership - The Rust Book", None),
            "Understanding Ownership"
        );
        assert_eq!(clean_title("Metro schedules — TMB", None), "Metro schedules");
        // Hyphenated words are not separators
        assert_eq!(clean_title("Real-time systems", None), "Real-time systems");
    }

    #[test]
    fn test_is_generic_title() {
        assert!(is_generic_title("Home"));
        assert!(is_generic_title("Github - Home Page"));
        assert!(is_generic_title("Welcome to our site"));
        assert!(is_generic_title("example.com"));
        assert!(is_generic_title(""));
        assert!(!is_generic_title("Understanding Ownership"));
        assert!(!is_generic_title("Homeopathy basics"));
    }

    #[test]
    fn test_sanitize_generated_title() {
        assert_eq!(
            sanitize_generated_title("\"Rust Ownership Guide\"\nextra"),
            Some("Rust Ownership Guide".to_string())
        );
        assert_eq!(sanitize_generated_title("  \n "), None);

        let long = "x".repeat(150);
        let cut = sanitize_generated_title(&long).unwrap();
        assert_eq!(cut.chars().count(), 100);
        assert!(cut.ends_with("..."));
    }
}
