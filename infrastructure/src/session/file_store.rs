//! File-backed session store
//!
//! One pretty-printed JSON file per session: `<dir>/<id>.json`. Writes go
//! to a temporary sibling first and are renamed into place, so a crash
//! mid-write never leaves a truncated record behind.

use super::validate_session_id;
use async_trait::async_trait;
use forge_application::ports::session_store::{SessionStore, SessionStoreError};
use forge_domain::SessionRecord;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const EXTENSION: &str = "json";

pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store under the platform data directory (`~/.local/share/codeforge/sessions`
    /// on Linux), or `./.codeforge/sessions` when none is known.
    pub fn default_location() -> Self {
        let dir = dirs::data_dir()
            .map(|d| d.join("codeforge").join("sessions"))
            .unwrap_or_else(|| PathBuf::from(".codeforge").join("sessions"));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, SessionStoreError> {
        validate_session_id(id)?;
        Ok(self.dir.join(format!("{id}.{EXTENSION}")))
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self, id: &str) -> Result<Option<SessionRecord>, SessionStoreError> {
        let path = self.path_for(id)?;
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_str(&content).map_err(|e| {
            SessionStoreError::Serialization(format!("{}: {e}", path.display()))
        })?;
        Ok(Some(record))
    }

    async fn save(&self, record: &SessionRecord) -> Result<(), SessionStoreError> {
        let path = self.path_for(&record.id)?;
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| SessionStoreError::Serialization(e.to_string()))?;

        fs::create_dir_all(&self.dir).await?;
        let tmp = self
            .dir
            .join(format!(".{}.{}.tmp", record.id, uuid::Uuid::new_v4().simple()));
        fs::write(&tmp, json).await?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        debug!(session_id = %record.id, path = %path.display(), "Session saved");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>, SessionStoreError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                if validate_session_id(id).is_ok() {
                    ids.push(id.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_domain::ConversationMessage;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("sessions"));

        let mut record = SessionRecord::new("s-1");
        record.push_message(ConversationMessage::user("Build a todo list API"));
        store.save(&record).await.unwrap();

        let loaded = store.load("s-1").await.unwrap().unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_missing_session_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(store.load("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_overwrites_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());

        let mut record = SessionRecord::new("s-1");
        store.save(&record).await.unwrap();
        record.push_message(ConversationMessage::user("again"));
        store.save(&record).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["s-1.json"]);
        assert_eq!(store.load("s-1").await.unwrap().unwrap().messages.len(), 1);
    }

    #[tokio::test]
    async fn test_list_ignores_foreign_files() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        store.save(&SessionRecord::new("b")).await.unwrap();
        store.save(&SessionRecord::new("a")).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        assert_eq!(store.list().await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_of_missing_dir_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path().join("absent"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.json"), "{ not json").unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(matches!(
            store.load("bad").await,
            Err(SessionStoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = TempDir::new().unwrap();
        let store = FileSessionStore::new(dir.path());
        assert!(matches!(
            store.load("../secret").await,
            Err(SessionStoreError::InvalidId(_))
        ));
    }
}
