//! The single response envelope every agent returns.

use super::artifacts::AgentOutput;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Outcome of an agent invocation.
///
/// The orchestrator branches on this field alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Success,
    Error,
    PartialSuccess,
    RequiresFeedback,
}

impl ResponseStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ResponseStatus::Success => "success",
            ResponseStatus::Error => "error",
            ResponseStatus::PartialSuccess => "partial_success",
            ResponseStatus::RequiresFeedback => "requires_feedback",
        }
    }
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Response from an agent (Value Object).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub status: ResponseStatus,
    pub data: Option<AgentOutput>,
    pub message: String,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl AgentResponse {
    pub fn success(data: AgentOutput, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Success,
            data: Some(data),
            message: message.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            data: None,
            message: message.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn partial(data: AgentOutput, message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::PartialSuccess,
            data: Some(data),
            message: message.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn requires_feedback(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::RequiresFeedback,
            data: None,
            message: message.into(),
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}
