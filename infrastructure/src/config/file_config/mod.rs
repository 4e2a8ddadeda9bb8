//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agents;
mod models;
mod output;
mod providers;
mod storage;

pub use agents::FileAgentsConfig;
pub use models::FileModelEntry;
pub use output::FileOutputConfig;
pub use providers::{FileProviderEndpoint, FileProvidersConfig};
pub use storage::{FileLoggingConfig, FilePromptsConfig, FileSessionConfig};

use forge_application::OrchestratorConfig;
use forge_domain::ModelConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// How serious a configuration issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// A problem found while validating the loaded configuration.
///
/// Issues never abort startup; the offending value is skipped or replaced
/// by its default and the issue is reported.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{label}: {}", self.message)
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Backend models, tried in priority order
    pub models: Vec<FileModelEntry>,
    /// Provider defaults and HTTP timeout
    pub providers: FileProvidersConfig,
    /// Per-agent model pinning
    pub agents: FileAgentsConfig,
    /// Turn chaining and history window
    pub orchestrator: OrchestratorConfig,
    /// Session store location
    pub session: FileSessionConfig,
    /// Prompt template overrides
    pub prompts: FilePromptsConfig,
    /// Log and transcript files
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// Implicit config files that were dropped while loading
    #[serde(skip)]
    pub skipped_sources: Vec<ConfigIssue>,
}

impl FileConfig {
    /// Usable model configs with provider defaults applied.
    ///
    /// Invalid entries are skipped. When nothing usable remains, the
    /// built-in default model is returned so the registry is never empty
    /// by configuration alone.
    pub fn model_configs(&self) -> Vec<ModelConfig> {
        let configs: Vec<ModelConfig> = self
            .models
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.to_model_config(i).ok())
            .map(|config| self.providers.apply_defaults(config))
            .collect();

        if configs.is_empty() {
            vec![self.providers.apply_defaults(ModelConfig::builtin_default())]
        } else {
            configs
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.providers.request_timeout_secs)
    }

    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<ConfigIssue> = self
            .models
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.to_model_config(i).err())
            .collect();
        issues.extend(self.skipped_sources.iter().cloned());

        if self.models.is_empty() {
            issues.push(ConfigIssue::new(
                Severity::Warning,
                format!(
                    "no [[models]] configured, using built-in default {}",
                    ModelConfig::builtin_default().id()
                ),
            ));
        }

        if self.providers.request_timeout_secs == 0 {
            issues.push(ConfigIssue::new(
                Severity::Error,
                "providers.request_timeout_secs cannot be 0",
            ));
        }

        if self.orchestrator.max_auto_steps == 0 {
            issues.push(ConfigIssue::new(
                Severity::Warning,
                "orchestrator.max_auto_steps is 0, --auto will run a single step",
            ));
        }

        let configured = self.model_configs();
        for (agent, id) in self.agents.model_overrides() {
            if !configured.iter().any(|m| m.matches_id(&id)) {
                issues.push(ConfigIssue::new(
                    Severity::Error,
                    format!("agents.{}: model '{id}' is not configured", agent.as_str()),
                ));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_domain::{AgentType, OutputFormat};

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[[models]]
provider = "anthropic"
model = "claude-sonnet-4-5"
priority = 10

[[models]]
provider = "ollama"
model = "qwen2.5-coder"
base_url = "http://gpu-box:11434"

[providers]
request_timeout_secs = 60

[providers.openai]
base_url = "http://localhost:8000/v1"

[agents]
coder = "anthropic:claude-sonnet-4-5"

[orchestrator]
auto_continue = true
max_auto_steps = 4

[session]
dir = "/tmp/forge-sessions"

[output]
format = "full"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[0].priority, 10);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(
            config.providers.openai.base_url.as_deref(),
            Some("http://localhost:8000/v1")
        );
        let openai = config
            .providers
            .apply_defaults(ModelConfig::new("openai", "gpt-4o"));
        assert_eq!(openai.api_key_env.as_deref(), Some("OPENAI_API_KEY"));
        assert_eq!(config.orchestrator.max_auto_steps, 4);
        assert!(config.orchestrator.auxiliary_tasks);
        assert_eq!(config.output.format, Some(OutputFormat::Full));
        assert_eq!(
            config.agents.model_overrides()[&AgentType::Coder],
            "anthropic:claude-sonnet-4-5"
        );
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_default_config_uses_builtin_model() {
        let config = FileConfig::default();
        let models = config.model_configs();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].id(), "ollama:llama3.1");

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_invalid_entries_are_skipped() {
        let toml_str = r#"
[[models]]
provider = "openai"

[[models]]
provider = "openai"
model = "gpt-4o"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let models = config.model_configs();
        assert_eq!(models.len(), 1);
        assert_eq!(models[0].api_key_env.as_deref(), Some("OPENAI_API_KEY"));

        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].to_string().starts_with("error: models[0].model"));
    }

    #[test]
    fn test_all_entries_invalid_falls_back_to_builtin() {
        let toml_str = r#"
[[models]]
model = "orphan"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.model_configs()[0].id(), "ollama:llama3.1");
    }

    #[test]
    fn test_pinned_agent_model_must_be_configured() {
        let toml_str = r#"
[agents]
security = "openai:gpt-4o"
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let issues = config.validate();
        assert!(
            issues
                .iter()
                .any(|i| i.severity == Severity::Error && i.message.contains("agents.security"))
        );
    }

    #[test]
    fn test_zero_timeout_is_error() {
        let mut config = FileConfig::default();
        config.providers.request_timeout_secs = 0;
        assert!(
            config
                .validate()
                .iter()
                .any(|i| i.message.contains("request_timeout_secs"))
        );
    }
}
