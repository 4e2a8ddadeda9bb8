//! Extraction of JSON payloads from LLM output.
//!
//! Models frequently wrap JSON in markdown fences or add a sentence of
//! prose around it. [`extract_json`] tries, in order: the whole text, the
//! first fenced block, and the outermost `{ ... }` span.

use super::AgentError;
use forge_domain::summarize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Maximum number of raw-output bytes echoed back in error messages.
const RAW_ECHO_LIMIT: usize = 500;

/// Find a JSON object in `text`.
pub fn extract_json(text: &str) -> Option<Value> {
    let trimmed = text.trim();

    if let Some(value) = parse_object(trimmed) {
        return Some(value);
    }

    if let Some(value) = fenced_block(trimmed).and_then(parse_object) {
        return Some(value);
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&trimmed[start..=end])
}

fn parse_object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text)
        .ok()
        .filter(|v| v.is_object())
}

/// Content of the first ``` fenced block, without its language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_open = &text[open + 3..];
    let body_start = after_open.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_open[body_start..];
    let close = body.find("```")?;
    Some(body[..close].trim())
}

/// Parse the model output or fail with the raw text attached.
pub fn require_json(text: &str) -> Result<Value, AgentError> {
    extract_json(text).ok_or_else(|| invalid_output("no JSON object found", text))
}

/// Deserialize the array under `key`; a missing or non-array key is a shape error.
pub fn take_array<T: DeserializeOwned>(
    json: &Value,
    key: &str,
    raw: &str,
) -> Result<Vec<T>, AgentError> {
    let value = json
        .get(key)
        .filter(|v| v.is_array())
        .ok_or_else(|| invalid_output(&format!("missing array '{key}'"), raw))?;
    serde_json::from_value(value.clone())
        .map_err(|e| invalid_output(&format!("malformed '{key}': {e}"), raw))
}

/// Optional string field, empty when absent.
pub fn string_field(json: &Value, key: &str) -> String {
    json.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

pub fn invalid_output(reason: &str, raw: &str) -> AgentError {
    AgentError::InvalidOutput {
        reason: reason.to_string(),
        raw: summarize(raw, RAW_ECHO_LIMIT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let value = extract_json(r#"{"success": true}"#).unwrap();
        assert_eq!(value["success"], true);
    }

    #[test]
    fn test_fenced_json() {
        let text = "Here you go:\n```json\n{\"risks\": []}\n```\nLet me know.";
        let value = extract_json(text).unwrap();
        assert!(value["risks"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let text = "Sure! {\"user_stories\": [{\"id\": \"US-1\"}]} Hope this helps.";
        let value = extract_json(text).unwrap();
        assert_eq!(value["user_stories"][0]["id"], "US-1");
    }

    #[test]
    fn test_not_json() {
        assert!(extract_json("I cannot help with that.").is_none());
        assert!(extract_json("[1, 2, 3]").is_none());
    }

    #[test]
    fn test_take_array_missing_key_includes_raw() {
        let raw = r#"{"stories": []}"#;
        let json = extract_json(raw).unwrap();
        let err = take_array::<serde_json::Value>(&json, "user_stories", raw).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("missing array 'user_stories'"));
        assert!(message.contains("stories"));
    }

    #[test]
    fn test_require_json_truncates_raw_echo() {
        let raw = "x".repeat(2000);
        match require_json(&raw).unwrap_err() {
            AgentError::InvalidOutput { raw, .. } => assert!(raw.len() <= RAW_ECHO_LIMIT),
            other => panic!("unexpected error: {other}"),
        }
    }
}
