//! Content extraction strategies
//!
//! A strategy turns a fetched HTML body into clean text. The primary
//! strategy looks for the article body and page metadata; the fallback
//! strategy strips scripts and styles and keeps whatever text is visible.

use crate::state::ErrorKind;
use scraper::{ElementRef, Html, Selector};

/// Containers tried, in order, when looking for the article body
const ARTICLE_CONTAINERS: &[&str] = &[
    "article",
    "main",
    "[role='main']",
    ".post-content",
    ".entry-content",
    ".article-body",
    "#content",
    ".content",
    "div.markdown-body",
];

/// Block elements whose text makes up the article body
const BLOCK_SELECTOR: &str = "h1, h2, h3, h4, h5, h6, p, li, pre, blockquote, td";

/// Elements whose text is never visible
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// Result of running one strategy over one fetched page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchOutcome {
    pub success: bool,
    pub text: Option<String>,
    pub title: Option<String>,
    pub html_snippet: Option<String>,
    pub language: Option<String>,
    pub word_count: usize,
    pub error_kind: Option<ErrorKind>,
    pub error_detail: Option<String>,
}

impl FetchOutcome {
    pub fn failed(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            error_kind: Some(kind),
            error_detail: Some(detail.into()),
            ..Self::default()
        }
    }
}

/// One way of turning a fetched page into text
pub trait ContentExtractor: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn extract(&self, html: &str) -> FetchOutcome;
}

/// Structured article extraction
///
/// Picks the first article-like container and joins the text of its block
/// elements. Text shorter than `min_length` characters is reported as
/// `insufficient_content` so the caller can retry.
#[derive(Debug, Clone)]
pub struct ArticleExtractor {
    min_length: usize,
    snippet_length: usize,
}

impl ArticleExtractor {
    pub fn new(min_length: usize, snippet_length: usize) -> Self {
        Self {
            min_length,
            snippet_length,
        }
    }

    fn article_text(document: &Html) -> String {
        let Ok(blocks) = Selector::parse(BLOCK_SELECTOR) else {
            return String::new();
        };

        for container in ARTICLE_CONTAINERS {
            let Ok(selector) = Selector::parse(container) else {
                continue;
            };
            if let Some(element) = document.select(&selector).next() {
                let text = block_text(element, &blocks);
                if !text.is_empty() {
                    return text;
                }
                let text = visible_text(element);
                if !text.is_empty() {
                    return text;
                }
            }
        }

        // No container: fall back to every block in the body
        match Selector::parse("body") {
            Ok(body) => document
                .select(&body)
                .next()
                .map(|element| block_text(element, &blocks))
                .unwrap_or_default(),
            Err(_) => String::new(),
        }
    }
}

impl ContentExtractor for ArticleExtractor {
    fn name(&self) -> &'static str {
        "article"
    }

    fn extract(&self, html: &str) -> FetchOutcome {
        let document = Html::parse_document(html);
        let text = Self::article_text(&document);
        let length = text.chars().count();

        if length < self.min_length {
            return FetchOutcome::failed(
                ErrorKind::InsufficientContent,
                format!(
                    "Extracted {} characters, need at least {}",
                    length, self.min_length
                ),
            );
        }

        FetchOutcome {
            success: true,
            word_count: count_words(&text),
            title: extract_title(&document),
            language: extract_language(&document),
            html_snippet: Some(truncate_chars(html, self.snippet_length)),
            text: Some(text),
            error_kind: None,
            error_detail: None,
        }
    }
}

/// Generic visible-text extraction used after bot detection
///
/// Any non-empty text counts as success; output is capped at `max_length`
/// characters.
#[derive(Debug, Clone)]
pub struct VisibleTextExtractor {
    max_length: usize,
    snippet_length: usize,
}

impl VisibleTextExtractor {
    pub fn new(max_length: usize, snippet_length: usize) -> Self {
        Self {
            max_length,
            snippet_length,
        }
    }
}

impl ContentExtractor for VisibleTextExtractor {
    fn name(&self) -> &'static str {
        "visible-text"
    }

    fn extract(&self, html: &str) -> FetchOutcome {
        let document = Html::parse_document(html);
        let text = match Selector::parse("body") {
            Ok(body) => document
                .select(&body)
                .next()
                .map(visible_text)
                .unwrap_or_else(|| visible_text(document.root_element())),
            Err(_) => visible_text(document.root_element()),
        };

        if text.is_empty() {
            return FetchOutcome::failed(
                ErrorKind::FallbackFailed,
                "No visible text in fallback extraction",
            );
        }

        let text = truncate_chars(&text, self.max_length);
        FetchOutcome {
            success: true,
            word_count: count_words(&text),
            title: extract_title(&document),
            language: extract_language(&document),
            html_snippet: Some(truncate_chars(html, self.snippet_length)),
            text: Some(text),
            error_kind: None,
            error_detail: None,
        }
    }
}

/// Joins the text of every block element under `root`, one block per line
///
/// Nested blocks (a `p` inside an `li`) are only counted once, through
/// their outermost block.
fn block_text(root: ElementRef<'_>, blocks: &Selector) -> String {
    let mut lines = Vec::new();

    for element in root.select(blocks) {
        let nested = element
            .ancestors()
            .take_while(|node| node.id() != root.id())
            .filter_map(ElementRef::wrap)
            .any(|ancestor| blocks.matches(&ancestor));
        if nested {
            continue;
        }

        let line = collapse_whitespace(&visible_text(element));
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}

/// Text of every node under `root` that is not inside a hidden element
fn visible_text(root: ElementRef<'_>) -> String {
    let mut chunks = Vec::new();

    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map_or(false, |e| HIDDEN_ELEMENTS.contains(&e.name()))
        });
        if hidden {
            continue;
        }

        let chunk = collapse_whitespace(text);
        if !chunk.is_empty() {
            chunks.push(chunk);
        }
    }

    chunks.join("\n")
}

/// Page title from `og:title`, then `<title>`, then the first `<h1>`
pub fn extract_title(document: &Html) -> Option<String> {
    let og = Selector::parse("meta[property='og:title']")
        .ok()
        .and_then(|s| {
            document
                .select(&s)
                .next()
                .and_then(|e| e.value().attr("content"))
                .map(collapse_whitespace)
        })
        .filter(|t| !t.is_empty());
    if og.is_some() {
        return og;
    }

    ["title", "h1"].iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        document
            .select(&selector)
            .next()
            .map(|e| collapse_whitespace(&e.text().collect::<String>()))
            .filter(|t| !t.is_empty())
    })
}

/// Primary language subtag from `<html lang>` or a `content-language` meta tag
pub fn extract_language(document: &Html) -> Option<String> {
    let from_html = Selector::parse("html[lang]").ok().and_then(|s| {
        document
            .select(&s)
            .next()
            .and_then(|e| e.value().attr("lang"))
            .and_then(primary_subtag)
    });
    if from_html.is_some() {
        return from_html;
    }

    let meta = Selector::parse("meta[http-equiv][content]").ok()?;
    document
        .select(&meta)
        .filter(|e| {
            e.value()
                .attr("http-equiv")
                .map_or(false, |v| v.eq_ignore_ascii_case("content-language"))
        })
        .find_map(|e| e.value().attr("content").and_then(primary_subtag))
}

/// `en-US` -> `en`; rejects anything that is not a 2-3 letter code
fn primary_subtag(tag: &str) -> Option<String> {
    let primary = tag.trim().split(['-', '_', ',']).next()?.to_lowercase();
    let valid = (2..=3).contains(&primary.len()) && primary.chars().all(|c| c.is_ascii_alphabetic());
    valid.then_some(primary)
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keeps at most `max` characters, never splitting a UTF-8 sequence
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}
