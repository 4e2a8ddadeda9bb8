//! Type definitions for the Orchestrate use case.

use super::context_builder::ContextError;
use crate::ports::session_store::SessionStoreError;
use forge_domain::{
    AgentOutput, AgentResponse, AgentType, ResponseStatus, SessionStatus, StepStatus,
};
use serde::Serialize;
use thiserror::Error;

/// Errors that abort a turn
#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("No {0} agent is registered")]
    AgentUnavailable(AgentType),

    #[error(transparent)]
    MissingContext(#[from] ContextError),

    #[error("Session {0} has nothing to process: send a message first")]
    NothingToProcess(String),

    /// The session could not be durably recorded. Fatal for the session.
    #[error("Session persistence failed: {0}")]
    Persistence(#[from] SessionStoreError),
}

impl OrchestratorError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, OrchestratorError::Persistence(_))
    }
}

/// Input for one orchestrator turn
#[derive(Debug, Clone, Default)]
pub struct TurnInput {
    /// Existing session to continue; a new one is created when absent or unknown
    pub session_id: Option<String>,
    /// New user message. `None` re-runs routing on the existing history.
    pub message: Option<String>,
    /// Bypass routing and send the turn to this agent
    pub agent: Option<AgentType>,
}

impl TurnInput {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// A follow-up turn with no new user message
    pub fn continuation(session_id: impl Into<String>, agent: AgentType) -> Self {
        Self {
            session_id: Some(session_id.into()),
            message: None,
            agent: Some(agent),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_agent(mut self, agent: AgentType) -> Self {
        self.agent = Some(agent);
        self
    }
}

/// Output of one orchestrator turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub session_id: String,
    pub agent: AgentType,
    /// Sequence number of the step recorded for this turn
    pub sequence: u32,
    /// Final status of that step, after any auxiliary demotion
    pub step_status: StepStatus,
    pub error: Option<String>,
    pub response: AgentResponse,
    /// Outputs of auxiliary jobs, already folded into the session context
    pub auxiliary: Vec<AgentOutput>,
    /// Agent to run for the following turn, if any
    pub continuation: Option<AgentType>,
    pub session_status: SessionStatus,
}

impl TurnOutcome {
    pub fn is_success(&self) -> bool {
        self.response.status == ResponseStatus::Success && self.step_status == StepStatus::Completed
    }
}
