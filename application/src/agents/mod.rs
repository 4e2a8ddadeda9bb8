//! Agents
//!
//! Every agent implements the uniform [`Agent`] contract: render a prompt,
//! call the [`LlmDispatcher`](crate::ports::llm_dispatcher::LlmDispatcher),
//! parse the JSON answer and map it onto an [`AgentResponse`].
//!
//! The Test and Security agents additionally expose narrow,
//! non-conversational capabilities ([`TestGenerator`],
//! [`SecurityAnalyzer`]) that the auxiliary task runner calls directly.

mod base;
pub mod coder;
pub mod format;
pub mod parsing;
pub mod product;
pub mod roster;
pub mod security;
pub mod tester;
#[cfg(test)]
pub(crate) mod test_support;

use crate::ports::llm_dispatcher::DispatchError;
use async_trait::async_trait;
use forge_domain::{
    AgentResponse, AgentTask, AgentType, GeneratedCode, GeneratedTests, SecurityReport, UserStory,
};
use thiserror::Error;

pub use coder::CoderAgent;
pub use product::ProductAgent;
pub use roster::AgentRoster;
pub use security::SecurityAgent;
pub use tester::TestAgent;

/// Errors inside an agent. `handle()` folds these into error responses;
/// the narrow capabilities return them to the caller.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Invalid task input: {0}")]
    InvalidInput(String),

    #[error("Prompt template not found: {agent}/{name}")]
    TemplateNotFound { agent: AgentType, name: String },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Invalid model output ({reason}): {raw}")]
    InvalidOutput { reason: String, raw: String },
}

/// The conversational contract shared by all agents
#[async_trait]
pub trait Agent: Send + Sync {
    fn agent_type(&self) -> AgentType;

    /// Process one task. Never fails: problems become `status: error`.
    async fn handle(&self, task: &AgentTask) -> AgentResponse;

    async fn is_available(&self) -> bool;

    fn capabilities(&self) -> Vec<String>;
}

/// Generate automated tests for a piece of code
#[async_trait]
pub trait TestGenerator: Send + Sync {
    async fn generate_tests(
        &self,
        code: &GeneratedCode,
        user_stories: &[UserStory],
    ) -> Result<GeneratedTests, AgentError>;
}

/// Review a piece of code for vulnerabilities
#[async_trait]
pub trait SecurityAnalyzer: Send + Sync {
    async fn analyze_code(
        &self,
        code: &GeneratedCode,
        user_stories: &[UserStory],
    ) -> Result<SecurityReport, AgentError>;
}
