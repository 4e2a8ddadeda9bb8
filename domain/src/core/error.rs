//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Unknown agent type: {0}")]
    UnknownAgentType(String),

    #[error("Unknown task type: {0}")]
    UnknownTaskType(String),

    #[error("Invalid model id: {0}")]
    InvalidModelId(String),

    #[error("Task input does not match agent {agent}: {detail}")]
    MismatchedTaskInput { agent: String, detail: String },
}

impl DomainError {
    /// Check if this error was caused by an unrecognized name
    pub fn is_unknown_name(&self) -> bool {
        matches!(
            self,
            DomainError::UnknownAgentType(_) | DomainError::UnknownTaskType(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_agent_display() {
        let error = DomainError::UnknownAgentType("designer".to_string());
        assert_eq!(error.to_string(), "Unknown agent type: designer");
    }

    #[test]
    fn test_is_unknown_name() {
        assert!(DomainError::UnknownAgentType("x".into()).is_unknown_name());
        assert!(DomainError::UnknownTaskType("x".into()).is_unknown_name());
        assert!(!DomainError::InvalidModelId("x".into()).is_unknown_name());
    }
}
