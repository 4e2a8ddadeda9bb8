//! Generation results returned by model adapters.

use serde::{Deserialize, Serialize};

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural end of response.
    #[default]
    Stop,
    /// Hit the token limit; output may be truncated.
    Length,
    /// Output withheld by the provider's content filter.
    ContentFilter,
    /// The provider reported an error in-band.
    Error,
}

impl FinishReason {
    /// Map a provider-specific stop reason onto the shared vocabulary.
    ///
    /// Covers OpenAI (`stop`, `length`, `content_filter`), Anthropic
    /// (`end_turn`, `stop_sequence`, `max_tokens`, `refusal`) and Ollama
    /// (`stop`, `length`) spellings; anything else counts as `Stop`.
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "length" | "max_tokens" => FinishReason::Length,
            "content_filter" | "refusal" => FinishReason::ContentFilter,
            "error" => FinishReason::Error,
            _ => FinishReason::Stop,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::Length => "length",
            FinishReason::ContentFilter => "content_filter",
            FinishReason::Error => "error",
        }
    }
}

/// Token accounting for one call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A completed generation (Value Object).
///
/// Produced once per successful adapter call. `provider` tells the caller
/// which backend actually served the request after fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmResponse {
    pub text: String,
    pub model: String,
    pub provider: String,
    pub usage: TokenUsage,
    pub finish_reason: FinishReason,
}

impl LlmResponse {
    pub fn new(
        text: impl Into<String>,
        model: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
            provider: provider.into(),
            usage: TokenUsage::default(),
            finish_reason: FinishReason::Stop,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = usage;
        self
    }

    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = reason;
        self
    }

    /// Whether the output was cut short by the token limit.
    pub fn is_truncated(&self) -> bool {
        self.finish_reason == FinishReason::Length
    }
}
