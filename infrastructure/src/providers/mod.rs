//! Model adapters and the registry that dispatches across them.
//!
//! One [`ModelAdapter`] exists per provider key; the
//! [`ModelRegistry`](registry::ModelRegistry) resolves each configured
//! model to its adapter by that key.

pub mod anthropic;
mod http;
pub mod ollama;
pub mod openai;
pub mod registry;

pub use anthropic::AnthropicAdapter;
pub use ollama::OllamaAdapter;
pub use openai::OpenAiAdapter;
pub use registry::{ModelRegistry, ModelStatus};

use async_trait::async_trait;
use forge_application::ports::llm_dispatcher::{GenerationError, Prompt};
use forge_domain::{GenerationOptions, LlmResponse, ModelConfig};
use std::sync::Arc;
use std::time::Duration;

/// Default HTTP timeout for a single generation request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-provider client
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Provider key this adapter serves ("openai", "anthropic", "ollama")
    fn provider_key(&self) -> &str;

    /// Run one generation. `options` are already merged over the model defaults.
    async fn generate(
        &self,
        config: &ModelConfig,
        prompt: &Prompt,
        options: &GenerationOptions,
    ) -> Result<LlmResponse, GenerationError>;

    /// Whether `config` can currently be served. Never fails.
    async fn is_available(&self, config: &ModelConfig) -> bool;

    /// Models the provider reports for `config`'s endpoint
    async fn list_models(&self, config: &ModelConfig) -> Result<Vec<String>, GenerationError> {
        Ok(vec![config.model.clone()])
    }
}

/// The three built-in adapters sharing one request timeout
pub fn default_adapters(timeout: Duration) -> Vec<Arc<dyn ModelAdapter>> {
    vec![
        Arc::new(OpenAiAdapter::new(timeout)),
        Arc::new(AnthropicAdapter::new(timeout)),
        Arc::new(OllamaAdapter::new(timeout)),
    ]
}
