//! Ollama local server adapter

use super::ModelAdapter;
use super::http::{build_client, ensure_success, request_error, trim_base_url};
use async_trait::async_trait;
use forge_application::ports::llm_dispatcher::{GenerationError, Prompt};
use forge_domain::{FinishReason, GenerationOptions, LlmResponse, ModelConfig, TokenUsage};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const PROVIDER_KEY: &str = "ollama";
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
/// Availability probes must not hang discovery for the full request timeout
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct OllamaAdapter {
    client: Client,
}

impl OllamaAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
        }
    }

    fn base_url(config: &ModelConfig) -> &str {
        trim_base_url(config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
    }

    async fn fetch_tags(&self, config: &ModelConfig) -> Result<Vec<String>, GenerationError> {
        let response = self
            .client
            .get(format!("{}/api/tags", Self::base_url(config)))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(request_error)?;
        let tags: TagList = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Default, Serialize)]
struct ChatOptions<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    message: ResponseMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: u32,
    #[serde(default)]
    eval_count: u32,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    models: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    name: String,
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
        stream: false,
        options: ChatOptions {
            temperature: options.temperature,
            top_p: options.top_p,
            num_predict: options.max_tokens,
            stop: (!options.stop.is_empty()).then_some(options.stop.as_slice()),
        },
    }
}

/// Ollama reports untagged pulls as `name:latest`.
fn tag_matches(tag: &str, model: &str) -> bool {
    tag == model || tag.strip_suffix(":latest") == Some(model)
}

fn into_llm_response(config: &ModelConfig, body: ChatResponse) -> LlmResponse {
    let finish = body
        .done_reason
        .as_deref()
        .map(FinishReason::from_provider)
        .unwrap_or_default();
    LlmResponse::new(
        body.message.content,
        body.model.unwrap_or_else(|| config.model.clone()),
        PROVIDER_KEY,
    )
    .with_usage(TokenUsage::new(body.prompt_eval_count, body.eval_count))
    .with_finish_reason(finish)
}

#[async_trait]
impl ModelAdapter for OllamaAdapter {
    fn provider_key(&self) -> &str {
        PROVIDER_KEY
    }

    async fn generate(
        &self,
        config: &ModelConfig,
        prompt: &Prompt,
        options: &GenerationOptions,
    ) -> Result<LlmResponse, GenerationError> {
        let url = format!("{}/api/chat", Self::base_url(config));
        debug!(model = %config.model, url = %url, "Ollama request");

        let response = self
            .client
            .post(url)
            .json(&build_request(config, prompt, options))
            .send()
            .await
            .map_err(request_error)?;
        let body: ChatResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| GenerationError::InvalidResponse(e.to_string()))?;

        Ok(into_llm_response(config, body))
    }

    async fn is_available(&self, config: &ModelConfig) -> bool {
        match self.fetch_tags(config).await {
            Ok(tags) => tags.iter().any(|tag| tag_matches(tag, &config.model)),
            Err(e) => {
                debug!(error = %e, "Ollama not reachable");
                false
            }
        }
    }

    async fn list_models(&self, config: &ModelConfig) -> Result<Vec<String>, GenerationError> {
        self.fetch_tags(config).await
    }
}
