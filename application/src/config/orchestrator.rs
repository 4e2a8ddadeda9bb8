//! Orchestrator parameters: use case loop control.

use serde::{Deserialize, Serialize};

/// Controls how far a turn may chain and how much history agents see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Follow the continuation chain without waiting for the user.
    pub auto_continue: bool,
    /// Maximum number of chained steps in one auto-continued run.
    pub max_auto_steps: usize,
    /// Number of history messages scanned for agent outputs.
    pub history_window: usize,
    /// Run the auxiliary task after a primary success.
    pub auxiliary_tasks: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            auto_continue: false,
            max_auto_steps: 8,
            history_window: 50,
            auxiliary_tasks: true,
        }
    }
}

impl OrchestratorConfig {
    // ==================== Builder Methods ====================

    pub fn with_auto_continue(mut self, enabled: bool) -> Self {
        self.auto_continue = enabled;
        self
    }

    pub fn with_max_auto_steps(mut self, max: usize) -> Self {
        self.max_auto_steps = max;
        self
    }

    pub fn with_history_window(mut self, window: usize) -> Self {
        self.history_window = window;
        self
    }

    pub fn with_auxiliary_tasks(mut self, enabled: bool) -> Self {
        self.auxiliary_tasks = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert!(!config.auto_continue);
        assert_eq!(config.max_auto_steps, 8);
        assert!(config.auxiliary_tasks);
    }

    #[test]
    fn test_builder() {
        let config = OrchestratorConfig::default()
            .with_auto_continue(true)
            .with_max_auto_steps(3)
            .with_history_window(10)
            .with_auxiliary_tasks(false);
        assert!(config.auto_continue);
        assert_eq!(config.max_auto_steps, 3);
        assert_eq!(config.history_window, 10);
        assert!(!config.auxiliary_tasks);
    }

    #[test]
    fn test_partial_deserialize_keeps_defaults() {
        let config: OrchestratorConfig = serde_json::from_str(r#"{"max_auto_steps": 2}"#).unwrap();
        assert_eq!(config.max_auto_steps, 2);
        assert_eq!(config.history_window, 50);
    }
}
