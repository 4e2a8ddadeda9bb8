//! In-memory session store for tests and ephemeral runs

use super::validate_session_id;
use async_trait::async_trait;
use forge_application::ports::session_store::{SessionStore, SessionStoreError};
use forge_domain::SessionRecord;
use parking_lot::Mutex;
use std::collections::BTreeMap;

#[derive(Default)]
pub struct InMemorySessionStore {
    records: Mutex<BTreeMap<String, SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: &str) -> Result<Option<SessionRecord>, SessionStoreError> {
        validate_session_id(id)?;
        Ok(self.records.lock().get(id).cloned())
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        validate_session_id(&record.id)?;
        self.records
            .lock()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, SessionStoreError> {
        Ok(self.records.lock().keys().cloned().collect())
    }
}
