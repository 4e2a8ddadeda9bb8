//! Storage locations from TOML (`[session]`, `[prompts]`, `[logging]`)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[session]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSessionConfig {
    /// Session store directory (default: platform data dir)
    pub dir: Option<PathBuf>,
}

/// `[prompts]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilePromptsConfig {
    /// Directory with `<agent>/<name>.txt` template overrides
    pub dir: Option<PathBuf>,
}

/// `[logging]` section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for the daily rolling diagnostic log
    pub dir: Option<PathBuf>,
    /// JSONL orchestration transcript file
    pub transcript: Option<PathBuf>,
}
