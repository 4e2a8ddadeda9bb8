//! Per-agent model pinning from TOML (`[agents]` section)

use forge_domain::AgentType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pin an agent to one model id (`"provider:model"` or a bare model name).
///
/// ```toml
/// [agents]
/// coder = "anthropic:claude-sonnet-4-5"
/// security = "openai:gpt-4o"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentsConfig {
    pub product: Option<String>,
    pub coder: Option<String>,
    pub test: Option<String>,
    pub security: Option<String>,
}

impl FileAgentsConfig {
    /// Pinned models keyed by agent; blank entries are ignored
    pub fn model_overrides(&self) -> HashMap<AgentType, String> {
        [
            (AgentType::Product, &self.product),
            (AgentType::Coder, &self.coder),
            (AgentType::Test, &self.test),
            (AgentType::Security, &self.security),
        ]
        .into_iter()
        .filter_map(|(agent, model)| {
            model
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(|m| (agent, m.to_string()))
        })
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_overrides_skip_blank() {
        let config = FileAgentsConfig {
            coder: Some("anthropic:claude-sonnet-4-5".to_string()),
            test: Some(" ".to_string()),
            ..Default::default()
        };
        let overrides = config.model_overrides();
        assert_eq!(overrides.len(), 1);
        assert_eq!(overrides[&AgentType::Coder], "anthropic:claude-sonnet-4-5");
    }
}
