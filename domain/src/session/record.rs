//! Persisted session record

use super::message::ConversationMessage;
use crate::orchestration::context::SessionContext;
use crate::orchestration::state::{OrchestratorState, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the session store persists for one session.
///
/// The orchestrator reads and writes only `state` (including its context)
/// and appends to `messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub messages: Vec<ConversationMessage>,
    pub state: OrchestratorState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            messages: Vec::new(),
            state: OrchestratorState::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A new session with a random id.
    pub fn create() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status
    }

    pub fn context(&self) -> &SessionContext {
        &self.state.context
    }

    pub fn push_message(&mut self, message: ConversationMessage) {
        self.messages.push(message);
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_idle() {
        let record = SessionRecord::create();
        assert_eq!(record.status(), SessionStatus::Idle);
        assert!(record.messages.is_empty());
        assert!(record.state.steps.is_empty());
        assert!(record.context().is_empty());
    }

    #[test]
    fn test_serde_roundtrip_preserves_state() {
        let mut record = SessionRecord::new("s-1");
        record.push_message(ConversationMessage::user("Build a todo list API"));
        let json = serde_json::to_string(&record).unwrap();
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
