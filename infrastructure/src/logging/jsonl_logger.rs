//! JSONL transcript writer for orchestration events.
//!
//! Each [`ConversationEvent`] becomes one JSON line carrying its payload
//! plus `type` and `timestamp`. The file is opened in append mode so one
//! transcript can span many invocations of the same session.

use forge_application::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

pub struct JsonlConversationLogger {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlConversationLogger {
    /// Open `path` for appending, creating it and its parent directories.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn to_record(event: ConversationEvent) -> Value {
    let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
    match event.payload {
        Value::Object(mut map) => {
            map.insert("type".to_string(), Value::String(event.event_type.to_string()));
            map.insert("timestamp".to_string(), Value::String(timestamp));
            Value::Object(map)
        }
        other => json!({
            "type": event.event_type,
            "timestamp": timestamp,
            "data": other,
        }),
    }
}

impl ConversationLogger for JsonlConversationLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(line) = serde_json::to_string(&to_record(event)) else {
            return;
        };

        let mut writer = self.writer.lock();
        // Flushed per line: a crashed run still leaves a readable transcript
        if let Err(e) = writeln!(writer, "{line}").and_then(|_| writer.flush()) {
            warn!(path = %self.path.display(), error = %e, "Transcript write failed");
        }
    }
}

impl Drop for JsonlConversationLogger {
    fn drop(&mut self) {
        let _ = self.writer.lock().flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_domain::{AgentType, StepStatus};

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("transcript.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();

        logger.log(ConversationEvent::step_started(
            "s-1",
            1,
            AgentType::Product,
            "Build a todo list API",
        ));
        logger.log(ConversationEvent::step_finished(
            "s-1",
            1,
            AgentType::Product,
            StepStatus::Completed,
            "3 user stories",
        ));
        logger.log(ConversationEvent::continuation(
            "s-1",
            AgentType::Product,
            Some(AgentType::Coder),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r["timestamp"].is_string()));
        assert_eq!(records[0]["type"], "step_started");
        assert_eq!(records[0]["agent"], "product");
        assert_eq!(records[1]["status"], "completed");
        assert_eq!(records[2]["next"], "coder");
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");

        for _ in 0..2 {
            let logger = JsonlConversationLogger::open(&path).unwrap();
            logger.log(ConversationEvent::auxiliary_task(
                "s-1",
                "generate_tests",
                true,
                "2 test files",
            ));
        }

        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.jsonl");
        let logger = JsonlConversationLogger::open(&path).unwrap();

        logger.log(ConversationEvent::new("note", json!("just a string")));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "note");
        assert_eq!(records[0]["data"], "just a string");
    }

    #[test]
    fn test_open_fails_when_parent_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        assert!(JsonlConversationLogger::open(blocker.join("transcript.jsonl")).is_err());
    }
}
