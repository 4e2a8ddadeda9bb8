//! Conversation history entries

use crate::agent::agent_type::AgentType;
use crate::agent::artifacts::AgentOutput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    pub fn as_str(&self) -> &str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

/// One entry of a session's conversation.
///
/// Assistant messages written by the orchestrator carry the producing agent
/// and its structured output, which is what context propagation scans for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default)]
    pub agent_type: Option<AgentType>,
    #[serde(default)]
    pub output: Option<AgentOutput>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// An assistant message tagged with the agent that produced it.
    pub fn from_agent(
        agent_type: AgentType,
        content: impl Into<String>,
        output: Option<AgentOutput>,
    ) -> Self {
        Self {
            agent_type: Some(agent_type),
            output,
            ..Self::assistant(content)
        }
    }

    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            agent_type: None,
            output: None,
            timestamp: Utc::now(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}
