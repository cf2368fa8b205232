//! Answer normalization across response shapes.
//!
//! The inference service does not always put the answer in the same place.
//! Extractors are tried in order and the first non-blank value wins; adding a
//! new shape means adding an entry to [`EXTRACTORS`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Pulls a candidate answer out of a response payload.
pub type Extractor = fn(&Value) -> Option<String>;

/// Extractors in priority order, named for logging.
pub const EXTRACTORS: &[(&str, Extractor)] = &[
    ("answer", answer_field),
    ("text", text_field),
    ("stringified", stringified),
];

static RE_ANSWER_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)^answer:\s*").unwrap());

fn answer_field(payload: &Value) -> Option<String> {
    payload.get("answer").and_then(Value::as_str).map(String::from)
}

fn text_field(payload: &Value) -> Option<String> {
    payload.get("text").and_then(Value::as_str).map(String::from)
}

fn stringified(payload: &Value) -> Option<String> {
    match payload {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Find the raw answer in a response body.
///
/// Bodies wrapped in a `data` envelope are unwrapped first.
pub fn extract_answer(body: &Value) -> Option<String> {
    let payload = body.get("data").unwrap_or(body);
    EXTRACTORS.iter().find_map(|(name, extract)| {
        let value = extract(payload).filter(|v| !v.trim().is_empty())?;
        tracing::trace!("Answer taken from '{name}'");
        Some(value)
    })
}

/// Strip a leading `Answer:` label (any case) and surrounding whitespace.
pub fn clean_answer(raw: &str) -> String {
    RE_ANSWER_LABEL.replace(raw.trim(), "").trim().to_string()
}
