//! OpenAI chat-completions adapter.
//!
//! Also serves OpenAI-compatible servers through `base_url`.

use super::ModelAdapter;
use super::http::{build_client, ensure_success, request_error, trim_base_url};
use async_trait::async_trait;
use forge_application::ports::llm_dispatcher::{GenerationError, Prompt};
use forge_domain::{FinishReason, GenerationOptions, LlmResponse, ModelConfig, TokenUsage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const PROVIDER_KEY: &str = "openai";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

pub struct OpenAiAdapter {
    client: Client,
}

impl OpenAiAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
        }
    }

    fn base_url(config: &ModelConfig) -> &str {
        trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
    }

    /// A custom endpoint may not need a key (local OpenAI-compatible servers).
    fn is_custom_endpoint(config: &ModelConfig) -> bool {
        Self::base_url(config) != DEFAULT_BASE_URL
    }

    fn api_key(config: &ModelConfig) -> Result<Option<String>, GenerationError> {
        match config.resolve_api_key() {
            Some(key) => Ok(Some(key)),
            None if Self::is_custom_endpoint(config) => Ok(None),
            None => Err(GenerationError::MissingApiKey(
                config
                    .api_key_env
                    .clone()
                    .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string()),
            )),
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: String,
        key: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let builder = self.client.request(method, url);
        match key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

fn build_request<'a>(
    config: &'a ModelConfig,
    prompt: &'a Prompt,
    options: &'a GenerationOptions,
) -> ChatRequest<'a> {
    let mut messages = Vec::with_capacity(2);
    if let Some(system) = &prompt.system {
        messages.push(ChatMessage {
            role: "system",
            content: system,
        });
    }
    messages.push(ChatMessage {
        role: "user",
        content: &prompt.user,
    });
    ChatRequest {
        model: &config.model,
        messages,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        top_p: options.top_p,
        stop: (!options.stop.is_empty()).then_some(options.stop.as_slice()),
    }
}

fn into_llm_response(config: &ModelConfig, body: ChatResponse) -> Result<LlmResponse, GenerationError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::InvalidResponse("response has no choices".to_string()))?;
    let text = choice.message.content.unwrap_or_default();
    let usage = body
        .usage
        .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens))
        .unwrap_or_default();
    let finish = choice
        .finish_reason
        .as_deref()
        .map(FinishReason::from_provider)
        .unwrap_or_default();

    Ok(
        LlmResponse::new(text, body.model.unwrap_or_else(|| config.model.clone()), PROVIDER_KEY)
            .with_usage(usage)
            .with_finish_reason(finish),
    )
}

#[async_trait]
impl ModelAdapter for OpenAiAdapter {
    fn provider_key(&self) -> &str {
        PROVIDER_KEY
    }

    async fn generate(
        &self,
        config: &ModelConfig,
        prompt: &Prompt,
        options: &GenerationOptions,
    ) -> Result<LlmResponse, GenerationError> {
        let key = Self::api_key(config)?;
        let url = format!("{}/chat/completions", Self::base_url(config));
        debug!(model = %config.model, url = %url, "OpenAI request");

        let response = self
            .request(reqwest::Method::POST, url, key.as_deref())
            .json(&build_request(config, prompt, options))
            .send()
            .await
            .map_err(request_error)?;
        let body: ChatResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        into_llm_response(config, body)
    }

    async fn is_available(&self, config: &ModelConfig) -> bool {
        if config.resolve_api_key().is_some() {
            return true;
        }
        // Keyless local servers: probe the endpoint
        Self::is_custom_endpoint(config) && self.list_models(config).await.is_ok()
    }

    async fn list_models(&self, config: &ModelConfig) -> Result<Vec<String>, GenerationError> {
        let key = Self::api_key(config)?;
        let url = format!("{}/models", Self::base_url(config));
        let response = self
            .request(reqwest::Method::GET, url, key.as_deref())
            .send()
            .await
            .map_err(request_error)?;
        let list: ModelList = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body_shape() {
        let config = ModelConfig::new("openai", "gpt-4o");
        let prompt = Prompt::new("write code").with_system("you are a coder");
        let options = GenerationOptions::default().with_temperature(0.5);

        let body = serde_json::to_value(build_request(&config, &prompt, &options)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "gpt-4o",
                "messages": [
                    {"role": "system", "content": "you are a coder"},
                    {"role": "user", "content": "write code"}
                ],
                "temperature": 0.5
            })
        );
    }

    #[test]
    fn test_response_parsing() {
        let body: ChatResponse = serde_json::from_value(json!({
            "model": "gpt-4o-2024-08-06",
            "choices": [{"message": {"role": "assistant", "content": "{}"}, "finish_reason": "length"}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 30, "total_tokens": 42}
        }))
        .unwrap();
        let response = into_llm_response(&ModelConfig::new("openai", "gpt-4o"), body).unwrap();

        assert_eq!(response.text, "{}");
        assert_eq!(response.model, "gpt-4o-2024-08-06");
        assert_eq!(response.provider, "openai");
        assert_eq!(response.usage.total_tokens, 42);
        assert!(response.is_truncated());
    }

    #[test]
    fn test_empty_choices_is_invalid() {
        let body: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(
            into_llm_response(&ModelConfig::new("openai", "gpt-4o"), body),
            Err(GenerationError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_missing_key_on_default_endpoint() {
        let config = ModelConfig::new("openai", "gpt-4o").with_api_key_env("CODEFORGE_TEST_UNSET_KEY");
        assert!(matches!(
            OpenAiAdapter::api_key(&config),
            Err(GenerationError::MissingApiKey(env)) if env == "CODEFORGE_TEST_UNSET_KEY"
        ));
    }

    #[test]
    fn test_custom_endpoint_allows_no_key() {
        let config = ModelConfig::new("openai", "qwen")
            .with_api_key_env("CODEFORGE_TEST_UNSET_KEY")
            .with_base_url("http://localhost:8000/v1/");
        assert_eq!(OpenAiAdapter::base_url(&config), "http://localhost:8000/v1");
        assert!(matches!(OpenAiAdapter::api_key(&config), Ok(None)));
    }
}
