//! Prompt builders and generator-output parsing for the agents

use super::signals::UrlSignals;
use crate::state::Category;
use serde_json::Value;
use std::collections::BTreeSet;

/// Structured metadata parsed out of a generator response
#[derive(Debug, Clone, PartialEq)]
pub struct CurationPayload {
    pub summary: String,
    pub tags: BTreeSet<String>,
    pub category: Category,
    /// Self-reported confidence, when present and numeric
    pub confidence: Option<f64>,
}

/// Prompt for full-text mode: 3-sentence summary, 5-7 tags, one category
pub fn full_text_prompt(title: &str, text: &str) -> String {
    format!(
        r#"Analyze the following web content and produce structured metadata.

Title: {title}

Content:
{text}

Respond in JSON with exactly this structure:
{{
  "summary": "A summary of exactly 3 sentences that captures the essence of the content",
  "tags": ["tag1", "tag2", "tag3", "tag4", "tag5"],
  "category": "one main category"
}}

Valid categories: {categories}

Tags: generate 5-7 relevant, specific, descriptive tags.

Respond ONLY with the JSON, no additional explanation."#,
        title = title,
        text = text,
        categories = Category::prompt_list(),
    )
}

/// Prompt for URL-only mode, built from signals rather than page text
pub fn url_only_prompt(title: &str, signals: &UrlSignals) -> String {
    let hints: Vec<&str> = signals.category_hints.iter().map(|c| c.as_str()).collect();

    format!(
        r#"Analyze this limited information about a bookmark:

URL: {url}
Original title: {title}

Domain information:
- Domain: {domain}
- TLD: {suffix}
- Subdomains: {subdomains:?}

Path information:
- Segments: {segments:?}
- Detected category hints: {hints:?}

IMPORTANT CONTEXT: the page content could not be retrieved (blocked, timeout or error).
Use what you know about this domain and the patterns in the URL to make an educated inference.

Produce metadata in JSON:
{{
  "summary": "A 2-sentence summary of what this page probably contains",
  "tags": ["tag1", "tag2", "tag3", "tag4"],
  "category": "one main category",
  "confidence": 0.7
}}

Valid categories: {categories}

Examples of good inferences:
- URL "https://www.tmb.cat/es/horarios-metro" -> category "Transportation", tags ["public transport", "metro", "barcelona"], confidence 0.8
- URL "https://www.coursera.org/learn/machine-learning" -> category "Education", tags ["online learning", "machine learning"], confidence 0.9
- URL "https://github.com/user/awesome-python" -> category "Programming", tags ["python", "github", "resources"], confidence 0.9

Confidence:
- 0.9-1.0: very well-known domain (google.com, github.com, wikipedia.org)
- 0.7-0.8: recognizable domain or very descriptive path
- 0.5-0.6: unknown domain but informative path
- 0.3-0.4: very little information available

Respond ONLY with the JSON."#,
        url = signals.url,
        title = title,
        domain = signals.domain,
        suffix = signals.suffix,
        subdomains = signals.subdomains,
        segments = signals.path_segments,
        hints = hints,
        categories = Category::prompt_list(),
    )
}

/// Prompt asking for a short descriptive title
pub fn title_prompt(title: &str, sample: &str) -> String {
    format!(
        r#"Analyze the following web content and write a descriptive, concise title (60 characters maximum).

Original title: {title}

Content:
{sample}

Respond ONLY with the new title, nothing else."#
    )
}

/// Cuts out the outermost `{ ... }` span of a response
///
/// Generators often wrap the JSON in prose or code fences.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

/// Parses a generator response into a [`CurationPayload`]
///
/// `summary`, `tags` and `category` are required. Tags are lowercased,
/// trimmed and deduplicated; a comma-separated string is accepted in place
/// of an array.
pub fn parse_curation(raw: &str) -> Result<CurationPayload, String> {
    let json = extract_json_object(raw).ok_or_else(|| "No JSON object in response".to_string())?;
    let value: Value =
        serde_json::from_str(json).map_err(|e| format!("JSON parse error: {}", e))?;

    let summary = value
        .get("summary")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| "Missing or empty 'summary'".to_string())?
        .to_string();

    let tags: BTreeSet<String> = match value.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(normalize_tag)
            .filter(|t| !t.is_empty())
            .collect(),
        Some(Value::String(list)) => list
            .split(',')
            .map(normalize_tag)
            .filter(|t| !t.is_empty())
            .collect(),
        _ => return Err("Missing 'tags'".to_string()),
    };

    let category = value
        .get("category")
        .and_then(Value::as_str)
        .map(Category::parse_lenient)
        .ok_or_else(|| "Missing 'category'".to_string())?;

    let confidence = value.get("confidence").and_then(|c| match c {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    });

    Ok(CurationPayload {
        summary,
        tags,
        category,
        confidence,
    })
}

fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}
