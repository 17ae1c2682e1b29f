//! Response sanitizing: turns free-form model output into parseable JSON text.
//!
//! Models wrap JSON in markdown fences, leave a stray `json` tag behind, or add prose
//! around the object. `sanitize` handles the formatting; `parse_structured` adds a
//! clearly separated brace-recovery stage for the prose case.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::LlmError;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";

/// Extracts the JSON candidate from `raw`. Never fails; without a fence it returns
/// the trimmed input.
pub fn sanitize(raw: &str) -> &str {
    let inner = if let Some(start) = raw.find(JSON_FENCE) {
        let rest = &raw[start + JSON_FENCE.len()..];
        rest.find(FENCE).map_or(rest, |end| &rest[..end])
    } else {
        let mut parts = raw.split(FENCE);
        // First part is whatever precedes the opening fence.
        let _ = parts.next();
        parts.next().unwrap_or(raw)
    };

    strip_language_tag(inner.trim())
}

/// Drops a leading `json` token left over from a fence, e.g. `"json\n{...}"`.
fn strip_language_tag(text: &str) -> &str {
    let is_boundary = |c: char| c.is_whitespace() || c == '{' || c == '[';
    match text.strip_prefix("json") {
        Some(rest) if rest.is_empty() || rest.starts_with(is_boundary) => rest.trim(),
        _ => text,
    }
}

/// Parses model output into a JSON value.
///
/// Stage 1 parses the sanitized text strictly. Stage 2 (recovery) parses the slice
/// between the first `{` and the last `}` of the raw text; it is logged so it cannot
/// silently hide a broken prompt.
pub fn parse_structured(raw: &str) -> Result<Value, LlmError> {
    let cleaned = sanitize(raw);
    let strict_error = match serde_json::from_str::<Value>(cleaned) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Some(candidate) = brace_slice(raw) {
        if let Ok(value) = serde_json::from_str::<Value>(candidate) {
            warn!(
                error = %strict_error,
                "Strict JSON parse failed, recovered object by brace search"
            );
            return Ok(value);
        }
    }

    let preview: String = raw.chars().take(300).collect();
    warn!(error = %strict_error, preview = %preview, "Unrecoverable model response");
    Err(LlmError::MalformedResponse(strict_error.to_string()))
}

/// Typed variant of [`parse_structured`].
pub fn parse_structured_as<T: DeserializeOwned>(raw: &str) -> Result<T, LlmError> {
    let value = parse_structured(raw)?;
    serde_json::from_value(value).map_err(|e| LlmError::MalformedResponse(e.to_string()))
}

fn brace_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}
