//! HTTP helpers shared by the adapters

use forge_application::ports::llm_dispatcher::GenerationError;
use forge_domain::summarize;
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Longest provider error body echoed into [`GenerationError::Api`]
const ERROR_BODY_LIMIT: usize = 300;

pub(crate) fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Failed to build HTTP client, using defaults");
            Client::new()
        })
}

pub(crate) fn request_error(err: reqwest::Error) -> GenerationError {
    if err.is_timeout() {
        GenerationError::Timeout
    } else if err.is_decode() {
        GenerationError::InvalidResponse(err.to_string())
    } else {
        GenerationError::Connection(err.to_string())
    }
}

/// Pass a 2xx response through; turn anything else into an API error.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GenerationError::Api {
        status: status.as_u16(),
        message: summarize(&error_message(&body), ERROR_BODY_LIMIT),
    })
}

/// Extract `error.message` / `error` from a JSON error body, else the raw body.
pub(crate) fn error_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    match json.get("error") {
        Some(Value::String(message)) => message.clone(),
        Some(error) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
        None => body.to_string(),
    }
}

pub(crate) fn trim_base_url(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_openai_shape() {
        let body = r#"{"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body), "Incorrect API key provided");
    }

    #[test]
    fn test_error_message_ollama_shape() {
        assert_eq!(
            error_message(r#"{"error": "model 'llama9' not found"}"#),
            "model 'llama9' not found"
        );
    }

    #[test]
    fn test_error_message_plain_text() {
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://localhost:11434/"), "http://localhost:11434");
    }
}
