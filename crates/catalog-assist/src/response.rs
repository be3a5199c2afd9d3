//! Pulling JSON out of free-form model replies

use catalog_mapping::RankedCandidate;
use serde_json::Value;
use tracing::debug;

use crate::{AssistError, Result};

/// Find a JSON value in a reply.
///
/// Tries the whole text, then the first fenced block, then the widest
/// bracketed span starting at the first `{` or `[`.
pub fn extract_json(text: &str) -> Option<Value> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    if let Some(block) = fenced_block(text) {
        if let Ok(value) = serde_json::from_str(block) {
            return Some(value);
        }
    }

    let mut spans: Vec<(usize, char)> = [('{', '}'), ('[', ']')]
        .into_iter()
        .filter_map(|(open, close)| text.find(open).map(|start| (start, close)))
        .collect();
    spans.sort_by_key(|(start, _)| *start);

    spans.into_iter().find_map(|(start, close)| {
        let end = text.rfind(close)?;
        if end <= start {
            return None;
        }
        serde_json::from_str(&text[start..=end]).ok()
    })
}

/// Body of the first ``` fence, with any language tag dropped
fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")? + 3;
    let rest = &text[start..];
    let end = rest.find("```")?;
    let block = &rest[..end];

    // The tag runs to the first newline: ```json
    let body = match block.find('\n') {
        Some(newline) if !block[..newline].trim_start().starts_with(['{', '[']) => {
            &block[newline + 1..]
        }
        _ => block,
    };
    Some(body.trim())
}

/// Parse ranked candidates from a reply.
///
/// Accepts an array, a single candidate object, or an object wrapping the
/// array under `matches`. Entries that do not describe a candidate are
/// dropped.
pub fn extract_candidates(text: &str) -> Result<Vec<RankedCandidate>> {
    let value = extract_json(text)
        .ok_or_else(|| AssistError::InvalidResponse("no JSON found in reply".to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("matches") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(AssistError::InvalidResponse(
                    "'matches' is not an array".to_string(),
                ));
            }
            None => vec![Value::Object(map)],
        },
        other => {
            return Err(AssistError::InvalidResponse(format!(
                "expected candidate list, found {other}"
            )));
        }
    };

    let total = items.len();
    let candidates: Vec<RankedCandidate> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();
    if candidates.len() < total {
        debug!(
            dropped = total - candidates.len(),
            "Dropped malformed candidate entries"
        );
    }
    Ok(candidates)
}
