//! Output format value object

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a turn's outcome is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every artifact in full: stories, files, test results, risks
    Full,
    /// One block per step with counts and the agent's message (default)
    #[default]
    Summary,
    /// The raw turn outcome as JSON
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &str {
        match self {
            OutputFormat::Full => "full",
            OutputFormat::Summary => "summary",
            OutputFormat::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "full" => Ok(OutputFormat::Full),
            "summary" => Ok(OutputFormat::Summary),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}' (full, summary, json)")),
        }
    }
}
