//! Agent type value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// The four specialized agents of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    /// Requirements analysis: turns a requirement into user stories.
    Product,
    /// Code generation and fixing.
    Coder,
    /// Test generation and validation.
    Test,
    /// Security review.
    Security,
}

impl AgentType {
    pub const ALL: [AgentType; 4] = [
        AgentType::Product,
        AgentType::Coder,
        AgentType::Test,
        AgentType::Security,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            AgentType::Product => "product",
            AgentType::Coder => "coder",
            AgentType::Test => "test",
            AgentType::Security => "security",
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            AgentType::Product => "Product Agent",
            AgentType::Coder => "Coder Agent",
            AgentType::Test => "Test Agent",
            AgentType::Security => "Security Agent",
        }
    }
}

impl std::fmt::Display for AgentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "product" | "po" | "requirements" => Ok(AgentType::Product),
            "coder" | "code" | "developer" => Ok(AgentType::Coder),
            "test" | "tester" | "qa" => Ok(AgentType::Test),
            "security" | "sec" => Ok(AgentType::Security),
            other => Err(DomainError::UnknownAgentType(other.to_string())),
        }
    }
}
