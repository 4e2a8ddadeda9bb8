//! Progress notification port
//!
//! Defines the interface for reporting orchestration progress.
//! Implementations live in the presentation layer.

use forge_domain::{AgentType, StepStatus};

/// Callbacks fired while a turn is processed
pub trait ProgressNotifier: Send + Sync {
    /// Called after a step is marked in progress
    fn on_step_start(&self, agent: AgentType, sequence: u32);

    /// Called after a step is closed
    fn on_step_complete(&self, agent: AgentType, status: StepStatus, summary: &str);

    /// Called before an auxiliary task runs
    fn on_auxiliary_start(&self, _kind: &str) {}

    /// Called after an auxiliary task finishes
    fn on_auxiliary_complete(&self, _kind: &str, _success: bool) {}

    /// Called with the continuation decision of a successful step
    fn on_continuation(&self, _from: AgentType, _next: Option<AgentType>) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_step_start(&self, _agent: AgentType, _sequence: u32) {}
    fn on_step_complete(&self, _agent: AgentType, _status: StepStatus, _summary: &str) {}
}
