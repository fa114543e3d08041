//! Best-effort isolation of the JSON object embedded in free-text model output.
//!
//! This is a lossy boundary: the match is not validated as JSON. Callers must parse
//! the result defensively and handle the prose fallback.

use once_cell::sync::Lazy;
use regex::Regex;

// Greedy, dot matches newline: first `{` through last `}`.
static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\{.*\}").expect("JSON object pattern is valid"));

/// Returns the first brace-to-brace span of `text`, or `text` unchanged when there is none.
pub fn extract_json_candidate(text: &str) -> &str {
    JSON_OBJECT
        .find(text)
        .map(|m| m.as_str())
        .unwrap_or(text)
}
