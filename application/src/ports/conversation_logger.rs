//! Port for structured orchestration logging.
//!
//! Defines the [`ConversationLogger`] trait for recording orchestration
//! events (step transitions, auxiliary tasks, continuation decisions) to a
//! structured transcript.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostics, while this port captures a machine-readable
//! record of each session's steps (JSONL).

use forge_domain::{AgentType, StepStatus};
use serde_json::{Value, json};

/// A structured orchestration event.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "step_started", "continuation").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    pub fn step_started(session_id: &str, sequence: u32, agent: AgentType, input: &str) -> Self {
        Self::new(
            "step_started",
            json!({
                "session_id": session_id,
                "sequence": sequence,
                "agent": agent.as_str(),
                "input": input,
            }),
        )
    }

    pub fn step_finished(
        session_id: &str,
        sequence: u32,
        agent: AgentType,
        status: StepStatus,
        message: &str,
    ) -> Self {
        Self::new(
            "step_finished",
            json!({
                "session_id": session_id,
                "sequence": sequence,
                "agent": agent.as_str(),
                "status": status.as_str(),
                "message": message,
            }),
        )
    }

    pub fn auxiliary_task(session_id: &str, kind: &str, success: bool, detail: &str) -> Self {
        Self::new(
            "auxiliary_task",
            json!({
                "session_id": session_id,
                "kind": kind,
                "success": success,
                "detail": detail,
            }),
        )
    }

    pub fn continuation(session_id: &str, from: AgentType, next: Option<AgentType>) -> Self {
        Self::new(
            "continuation",
            json!({
                "session_id": session_id,
                "from": from.as_str(),
                "next": next.map(|a| a.as_str().to_string()),
            }),
        )
    }
}

/// Port for logging orchestration events to a structured log.
///
/// `log` is synchronous and infallible so that logging never disrupts a
/// session; implementations swallow their own I/O failures.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuation_payload_with_no_next() {
        let event = ConversationEvent::continuation("s-1", AgentType::Security, None);
        assert_eq!(event.event_type, "continuation");
        assert_eq!(event.payload["from"], "security");
        assert!(event.payload["next"].is_null());
    }

    #[test]
    fn test_step_finished_payload() {
        let event =
            ConversationEvent::step_finished("s-1", 3, AgentType::Coder, StepStatus::Error, "aux");
        assert_eq!(event.payload["sequence"], 3);
        assert_eq!(event.payload["status"], "error");
    }
}
