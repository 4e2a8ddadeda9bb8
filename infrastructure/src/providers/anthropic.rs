//! Anthropic messages API adapter

use super::ModelAdapter;
use super::http::{build_client, ensure_success, request_error, trim_base_url};
use async_trait::async_trait;
use forge_application::ports::llm_dispatcher::{GenerationError, Prompt};
use forge_domain::{FinishReason, GenerationOptions, LlmResponse, ModelConfig, TokenUsage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const PROVIDER_KEY: &str = "anthropic";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
const ANTHROPIC_VERSION: &str = "2023-06-01";
/// The messages API requires `max_tokens`
const DEFAULT_MAX_TOKENS: u32 = 4096;

pub struct AnthropicAdapter {
    client: Client,
}

impl AnthropicAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
        }
    }

    fn base_url(config: &ModelConfig) -> &str {
        trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
    }

    fn api_key(config: &ModelConfig) -> Result<String, GenerationError> {
        config.resolve_api_key().ok_or_else(|| {
            GenerationError::MissingApiKey(
                config
                    .api_key_env
                    .clone()
                    .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string()),
            )
        })
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop_sequences: Option<&'a [String]>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    model: Option<String>,
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
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
) -> MessagesRequest<'a> {
    MessagesRequest {
        model: &config.model,
        max_tokens: options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        system: prompt.system.as_deref(),
        messages: vec![Message {
            role: "user",
            content: &prompt.user,
        }],
        temperature: options.temperature,
        top_p: options.top_p,
        stop_sequences: (!options.stop.is_empty()).then_some(options.stop.as_slice()),
    }
}

fn into_llm_response(config: &ModelConfig, body: MessagesResponse) -> LlmResponse {
    let text: String = body
        .content
        .into_iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text),
            ContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("");
    let usage = body
        .usage
        .map(|u| TokenUsage::new(u.input_tokens, u.output_tokens))
        .unwrap_or_default();
    let finish = body
        .stop_reason
        .as_deref()
        .map(FinishReason::from_provider)
        .unwrap_or_default();

    LlmResponse::new(text, body.model.unwrap_or_else(|| config.model.clone()), PROVIDER_KEY)
        .with_usage(usage)
        .with_finish_reason(finish)
}

#[async_trait]
impl ModelAdapter for AnthropicAdapter {
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
        let url = format!("{}/messages", Self::base_url(config));
        debug!(model = %config.model, url = %url, "Anthropic request");

        let response = self
            .client
            .post(url)
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&build_request(config, prompt, options))
            .send()
            .await
            .map_err(request_error)?;
        let body: MessagesResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        Ok(into_llm_response(config, body))
    }

    async fn is_available(&self, config: &ModelConfig) -> bool {
        config.resolve_api_key().is_some()
    }

    async fn list_models(&self, config: &ModelConfig) -> Result<Vec<String>, GenerationError> {
        let key = Self::api_key(config)?;
        let response = self
            .client
            .get(format!("{}/models", Self::base_url(config)))
            .header("x-api-key", key)
            .header("anthropic-version", ANTHROPIC_VERSION)
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
