//! Model configuration value objects.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Sampling options for a single generation.
///
/// Every field is optional so that request-level options can be layered on
/// top of a model's defaults with [`GenerationOptions::merged_over`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
    pub stop: Vec<String>,
}

impl GenerationOptions {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Overlay `self` on top of `defaults`: any field set here wins.
    pub fn merged_over(&self, defaults: &GenerationOptions) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature.or(defaults.temperature),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            top_p: self.top_p.or(defaults.top_p),
            stop: if self.stop.is_empty() {
                defaults.stop.clone()
            } else {
                self.stop.clone()
            },
        }
    }
}

/// A configured LLM backend model (Value Object).
///
/// Immutable once loaded. The registry ranks models by [`priority`](Self::priority)
/// (higher first); equal priorities keep their configuration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Provider key used to resolve the adapter ("openai", "anthropic", "ollama", ...).
    pub provider: String,
    /// Provider-side model name.
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: Option<String>,
    /// Inline API key (prefer `api_key_env`).
    pub api_key: Option<String>,
    /// Override for the provider's base URL.
    pub base_url: Option<String>,
    pub priority: i32,
    pub context_window: u32,
    pub default_options: GenerationOptions,
}

impl ModelConfig {
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
            api_key_env: None,
            api_key: None,
            base_url: None,
            priority: 0,
            context_window: 8192,
            default_options: GenerationOptions::default(),
        }
    }

    /// The built-in entry used when no model configuration could be loaded.
    pub fn builtin_default() -> Self {
        Self::new("ollama", "llama3.1").with_base_url("http://localhost:11434")
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_key_env(mut self, env: impl Into<String>) -> Self {
        self.api_key_env = Some(env.into());
        self
    }

    pub fn with_context_window(mut self, tokens: u32) -> Self {
        self.context_window = tokens;
        self
    }

    pub fn with_default_options(mut self, options: GenerationOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Registry key: `"{provider}:{model}"`.
    pub fn id(&self) -> String {
        format!("{}:{}", self.provider, self.model)
    }

    /// Whether `id` names this model, either as `"{provider}:{model}"` or by
    /// bare model name.
    pub fn matches_id(&self, id: &str) -> bool {
        match id.split_once(':') {
            Some((provider, model)) if provider == self.provider => model == self.model,
            _ => id == self.model,
        }
    }

    /// Resolve the API key: inline key first, then the configured env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.is_empty()) {
            return Some(key.clone());
        }
        self.api_key_env
            .as_deref()
            .and_then(|name| std::env::var(name).ok())
            .filter(|k| !k.is_empty())
    }
}

impl std::str::FromStr for ModelConfig {
    type Err = DomainError;

    /// Parse a `"{provider}:{model}"` id into a config with default settings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((provider, model)) if !provider.is_empty() && !model.is_empty() => {
                Ok(ModelConfig::new(provider, model))
            }
            _ => Err(DomainError::InvalidModelId(s.to_string())),
        }
    }
}

/// Sort descending by priority. The sort is stable, so ties keep the
/// order in which they were configured.
pub fn rank_by_priority(models: &mut [ModelConfig]) {
    models.sort_by(|a, b| b.priority.cmp(&a.priority));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format() {
        let config = ModelConfig::new("openai", "gpt-4o");
        assert_eq!(config.id(), "openai:gpt-4o");
    }

    #[test]
    fn test_matches_id_qualified_and_bare() {
        let config = ModelConfig::new("ollama", "llama3.1");
        assert!(config.matches_id("ollama:llama3.1"));
        assert!(config.matches_id("llama3.1"));
        assert!(!config.matches_id("openai:llama3.1"));
        assert!(!config.matches_id("mistral"));
    }

    #[test]
    fn test_matches_id_model_name_containing_colon() {
        let config = ModelConfig::new("ollama", "llama3.1:8b");
        assert!(config.matches_id("ollama:llama3.1:8b"));
        assert!(config.matches_id("llama3.1:8b"));
    }

    #[test]
    fn test_rank_by_priority_is_stable() {
        let mut models = vec![
            ModelConfig::new("a", "low").with_priority(1),
            ModelConfig::new("b", "first-tie").with_priority(5),
            ModelConfig::new("c", "second-tie").with_priority(5),
            ModelConfig::new("d", "top").with_priority(9),
        ];
        rank_by_priority(&mut models);
        let order: Vec<_> = models.iter().map(|m| m.model.as_str()).collect();
        assert_eq!(order, vec!["top", "first-tie", "second-tie", "low"]);
    }

    #[test]
    fn test_options_merge() {
        let defaults = GenerationOptions {
            temperature: Some(0.2),
            max_tokens: Some(1024),
            top_p: Some(0.9),
            stop: vec!["END".to_string()],
        };
        let request = GenerationOptions::default().with_max_tokens(4096);
        let merged = request.merged_over(&defaults);
        assert_eq!(merged.temperature, Some(0.2));
        assert_eq!(merged.max_tokens, Some(4096));
        assert_eq!(merged.stop, vec!["END".to_string()]);
    }

    #[test]
    fn test_resolve_api_key_prefers_inline() {
        let mut config = ModelConfig::new("openai", "gpt-4o")
            .with_api_key_env("CODEFORGE_TEST_KEY_THAT_IS_NEVER_SET");
        assert_eq!(config.resolve_api_key(), None);
        config.api_key = Some("sk-inline".to_string());
        assert_eq!(config.resolve_api_key().as_deref(), Some("sk-inline"));
    }

    #[test]
    fn test_parse_model_id() {
        let config: ModelConfig = "anthropic:claude-sonnet-4-5".parse().unwrap();
        assert_eq!(config.provider, "anthropic");
        assert_eq!(config.model, "claude-sonnet-4-5");
        assert!("no-provider".parse::<ModelConfig>().is_err());
    }
}
