//! Provider defaults from TOML (`[providers]` section)
//!
//! Values here fill in any `[[models]]` entry that leaves `api_key_env` or
//! `base_url` unset.

use forge_domain::ModelConfig;
use serde::{Deserialize, Serialize};

/// Defaults for one provider
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderEndpoint {
    /// Environment variable name for the API key
    pub api_key_env: Option<String>,
    /// Base URL (e.g. an OpenAI-compatible proxy)
    pub base_url: Option<String>,
}

/// Key variable used when neither the model nor `[providers]` names one
fn default_api_key_env(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    /// Per-request HTTP timeout in seconds
    pub request_timeout_secs: u64,
    pub openai: FileProviderEndpoint,
    pub anthropic: FileProviderEndpoint,
    pub ollama: FileProviderEndpoint,
}

impl Default for FileProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 120,
            openai: FileProviderEndpoint::default(),
            anthropic: FileProviderEndpoint::default(),
            ollama: FileProviderEndpoint::default(),
        }
    }
}

impl FileProvidersConfig {
    fn endpoint(&self, provider: &str) -> Option<&FileProviderEndpoint> {
        match provider {
            "openai" => Some(&self.openai),
            "anthropic" => Some(&self.anthropic),
            "ollama" => Some(&self.ollama),
            _ => None,
        }
    }

    /// Fill unset key/url fields of `config` from this provider's defaults
    pub fn apply_defaults(&self, mut config: ModelConfig) -> ModelConfig {
        let endpoint = self.endpoint(&config.provider);
        if config.api_key_env.is_none() {
            config.api_key_env = endpoint
                .and_then(|e| e.api_key_env.clone())
                .or_else(|| default_api_key_env(&config.provider).map(str::to_string));
        }
        if config.base_url.is_none() {
            config.base_url = endpoint.and_then(|e| e.base_url.clone());
        }
        config
    }
}
