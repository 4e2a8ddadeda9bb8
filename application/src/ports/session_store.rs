//! Session persistence port

use async_trait::async_trait;
use forge_domain::SessionRecord;
use thiserror::Error;

/// Errors from the session store.
///
/// The orchestrator treats every one of these as fatal for the session.
#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid session id: {0}")]
    InvalidId(String),
}

/// Durable storage for session records
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session, `Ok(None)` if it does not exist
    async fn load(&self, id: &str) -> Result<Option<SessionRecord>, SessionStoreError>;

    /// Persist the full record, replacing any previous version
    async fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError>;

    /// Ids of all stored sessions
    async fn list(&self) -> Result<Vec<String>, SessionStoreError>;
}
