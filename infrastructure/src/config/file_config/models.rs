//! Backend model entries from TOML (`[[models]]` tables)

use super::{ConfigIssue, Severity};
use forge_domain::{GenerationOptions, ModelConfig};
use serde::{Deserialize, Serialize};

/// One `[[models]]` entry
///
/// # Example
///
/// ```toml
/// [[models]]
/// provider = "anthropic"
/// model = "claude-sonnet-4-5"
/// priority = 10
/// max_tokens = 8192
///
/// [[models]]
/// provider = "ollama"
/// model = "qwen2.5-coder"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelEntry {
    pub provider: String,
    pub model: String,
    /// Environment variable holding the API key (falls back to `[providers]`)
    pub api_key_env: Option<String>,
    /// Inline API key (not recommended, use `api_key_env`)
    pub api_key: Option<String>,
    /// Base URL override (falls back to `[providers]`)
    pub base_url: Option<String>,
    /// Higher is tried first
    pub priority: i32,
    pub context_window: Option<u32>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub stop: Vec<String>,
}

impl FileModelEntry {
    /// Convert to a domain model config, or report why the entry is unusable.
    pub fn to_model_config(&self, index: usize) -> Result<ModelConfig, ConfigIssue> {
        let field = format!("models[{index}]");
        if self.provider.trim().is_empty() {
            return Err(ConfigIssue::new(
                Severity::Error,
                format!("{field}.provider: provider cannot be empty"),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigIssue::new(
                Severity::Error,
                format!("{field}.model: model name cannot be empty"),
            ));
        }

        let mut config = ModelConfig::new(self.provider.trim(), self.model.trim())
            .with_priority(self.priority)
            .with_default_options(GenerationOptions {
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                top_p: self.top_p,
                stop: self.stop.clone(),
            });
        config.api_key_env = self.api_key_env.clone();
        config.api_key = self.api_key.clone();
        config.base_url = self.base_url.clone();
        if let Some(window) = self.context_window {
            config = config.with_context_window(window);
        }
        Ok(config)
    }
}
