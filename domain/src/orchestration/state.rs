//! Orchestrator state machine
//!
//! [`OrchestratorState`] lives inside the persisted session record and is
//! mutated in place through [`OrchestratorState::update_step`]. Steps form an
//! append-only history; only the last step may move from `InProgress` to a
//! terminal status.

use super::context::SessionContext;
use crate::agent::agent_type::AgentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Session-level status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::Idle => "idle",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    InProgress,
    Completed,
    Error,
}

impl StepStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, StepStatus::InProgress)
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One agent invocation within a session. Immutable once closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorStep {
    pub sequence: u32,
    pub agent_type: AgentType,
    pub status: StepStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub input_summary: Option<String>,
    pub output_summary: Option<String>,
}

/// The caller-supplied part of a step transition.
#[derive(Debug, Clone, PartialEq)]
pub struct StepUpdate {
    pub agent_type: AgentType,
    pub input_summary: Option<String>,
    pub output_summary: Option<String>,
}

impl StepUpdate {
    pub fn new(agent_type: AgentType) -> Self {
        Self {
            agent_type,
            input_summary: None,
            output_summary: None,
        }
    }

    pub fn with_input_summary(mut self, summary: impl Into<String>) -> Self {
        self.input_summary = Some(summary.into());
        self
    }

    pub fn with_output_summary(mut self, summary: impl Into<String>) -> Self {
        self.output_summary = Some(summary.into());
        self
    }
}

/// A rejected transition. The state is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("No step to close: the session has no steps")]
    NoSteps,

    #[error("Step {sequence} is already {status}; nothing in progress to close")]
    NotInProgress { sequence: u32, status: StepStatus },
}

/// Orchestration state of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorState {
    pub status: SessionStatus,
    pub current_agent: Option<AgentType>,
    #[serde(default)]
    pub context: SessionContext,
    #[serde(default)]
    pub steps: Vec<OrchestratorStep>,
}

impl OrchestratorState {
    /// Apply a step transition.
    ///
    /// - `InProgress` appends a new step, marks the session running and makes
    ///   `partial.agent_type` the current agent.
    /// - `Completed` / `Error` close the last step if it is in progress and
    ///   set the session to completed / failed. The current agent keeps the
    ///   terminal step's agent. If the last step is not in progress the state
    ///   is unchanged and a [`StateError`] is returned.
    pub fn update_step(
        &mut self,
        partial: StepUpdate,
        status: StepStatus,
        error: Option<String>,
    ) -> Result<&OrchestratorStep, StateError> {
        match status {
            StepStatus::InProgress => {
                let sequence = u32::try_from(self.steps.len())
                    .unwrap_or(u32::MAX)
                    .saturating_add(1);
                self.steps.push(OrchestratorStep {
                    sequence,
                    agent_type: partial.agent_type,
                    status: StepStatus::InProgress,
                    started_at: Utc::now(),
                    ended_at: None,
                    error: None,
                    input_summary: partial.input_summary,
                    output_summary: None,
                });
                self.status = SessionStatus::Running;
                self.current_agent = Some(partial.agent_type);
            }
            StepStatus::Completed | StepStatus::Error => {
                let step = self.steps.last_mut().ok_or(StateError::NoSteps)?;
                if step.status != StepStatus::InProgress {
                    return Err(StateError::NotInProgress {
                        sequence: step.sequence,
                        status: step.status,
                    });
                }
                step.status = status;
                step.ended_at = Some(Utc::now());
                step.error = error;
                if partial.output_summary.is_some() {
                    step.output_summary = partial.output_summary;
                }
                self.current_agent = Some(step.agent_type);
                self.status = if status == StepStatus::Completed {
                    SessionStatus::Completed
                } else {
                    SessionStatus::Failed
                };
            }
        }
        // A step was pushed or updated above, so `last()` is always present.
        self.steps.last().ok_or(StateError::NoSteps)
    }

    pub fn last_step(&self) -> Option<&OrchestratorStep> {
        self.steps.last()
    }

    /// The open step, if the last one is still in progress.
    pub fn in_progress_step(&self) -> Option<&OrchestratorStep> {
        self.steps
            .last()
            .filter(|step| step.status == StepStatus::InProgress)
    }

    /// The most recent step that reached a terminal status.
    pub fn last_closed_step(&self) -> Option<&OrchestratorStep> {
        self.steps.iter().rev().find(|step| step.status.is_terminal())
    }
}
