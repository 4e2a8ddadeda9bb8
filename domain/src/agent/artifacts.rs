//! Structured artifacts produced by agents.
//!
//! Each agent's LLM output is parsed into one of these types and carried
//! through the session as an [`AgentOutput`].

use super::agent_type::AgentType;
use serde::{Deserialize, Serialize};

/// A user story produced by the Product agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStory {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub acceptance_criteria: Vec<String>,
    #[serde(default)]
    pub priority: Option<String>,
}

impl UserStory {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            acceptance_criteria: Vec::new(),
            priority: None,
        }
    }
}

/// A single generated source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeFile {
    pub path: String,
    #[serde(default)]
    pub language: String,
    pub content: String,
}

impl CodeFile {
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let language = language_for_path(&path).to_string();
        Self {
            path,
            language,
            content: content.into(),
        }
    }
}

/// Code produced by the Coder agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub files: Vec<CodeFile>,
    #[serde(default)]
    pub explanation: String,
}

impl GeneratedCode {
    pub fn new(files: Vec<CodeFile>) -> Self {
        Self {
            files,
            explanation: String::new(),
        }
    }

    /// At least one file with non-blank content.
    pub fn is_usable(&self) -> bool {
        self.files.iter().any(|f| !f.content.trim().is_empty())
    }

    pub fn total_lines(&self) -> usize {
        self.files.iter().map(|f| f.content.lines().count()).sum()
    }
}

/// Test files produced by the Test agent's generation capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedTests {
    pub files: Vec<CodeFile>,
    #[serde(default)]
    pub summary: String,
}

impl GeneratedTests {
    pub fn is_usable(&self) -> bool {
        self.files.iter().any(|f| !f.content.trim().is_empty())
    }
}

/// Outcome of one simulated/validated test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseResult {
    pub name: String,
    pub passed: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Validation report produced by the Test agent.
///
/// `success` is `None` when the model did not commit to a verdict.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub success: Option<bool>,
    #[serde(default)]
    pub results: Vec<TestCaseResult>,
    #[serde(default)]
    pub failures: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

impl TestReport {
    pub fn passed() -> Self {
        Self {
            success: Some(true),
            ..Default::default()
        }
    }

    pub fn failed(failures: Vec<String>) -> Self {
        Self {
            success: Some(false),
            failures,
            ..Default::default()
        }
    }

    /// Failure descriptions, falling back to the names of failed cases.
    pub fn failure_descriptions(&self) -> Vec<String> {
        if !self.failures.is_empty() {
            return self.failures.clone();
        }
        self.results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| match &r.message {
                Some(msg) => format!("{}: {}", r.name, msg),
                None => r.name.clone(),
            })
            .collect()
    }
}

/// Severity of a security finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// One finding from the Security agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityRisk {
    pub id: String,
    pub severity: Severity,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub recommendation: Option<String>,
}

/// Security review report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityReport {
    pub risks: Vec<SecurityRisk>,
    #[serde(default)]
    pub summary: String,
}

impl SecurityReport {
    pub fn has_risks(&self) -> bool {
        !self.risks.is_empty()
    }

    pub fn highest_severity(&self) -> Option<Severity> {
        self.risks.iter().map(|r| r.severity).max()
    }
}

/// Where a fix request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSource {
    Security,
    Test,
}

/// An issue the Coder agent is asked to fix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixIssue {
    pub source: IssueSource,
    pub description: String,
    #[serde(default)]
    pub file: Option<String>,
}

impl FixIssue {
    pub fn from_risk(risk: &SecurityRisk) -> Self {
        let mut description = format!("[{}] {}", risk.severity.as_str(), risk.title);
        if !risk.description.is_empty() {
            description.push_str(": ");
            description.push_str(&risk.description);
        }
        if let Some(rec) = &risk.recommendation {
            description.push_str(" (recommendation: ");
            description.push_str(rec);
            description.push(')');
        }
        Self {
            source: IssueSource::Security,
            description,
            file: risk.file.clone(),
        }
    }

    pub fn from_test_failure(failure: impl Into<String>) -> Self {
        Self {
            source: IssueSource::Test,
            description: failure.into(),
            file: None,
        }
    }
}

/// Structured output carried by an [`AgentResponse`](super::response::AgentResponse).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AgentOutput {
    UserStories(Vec<UserStory>),
    Code(GeneratedCode),
    Tests(GeneratedTests),
    TestReport(TestReport),
    SecurityReport(SecurityReport),
}

impl AgentOutput {
    /// The agent whose conversational output this is.
    pub fn producer(&self) -> AgentType {
        match self {
            AgentOutput::UserStories(_) => AgentType::Product,
            AgentOutput::Code(_) => AgentType::Coder,
            AgentOutput::Tests(_) | AgentOutput::TestReport(_) => AgentType::Test,
            AgentOutput::SecurityReport(_) => AgentType::Security,
        }
    }

    /// One-line description used for step output summaries.
    pub fn summary(&self) -> String {
        match self {
            AgentOutput::UserStories(stories) => format!("{} user stories", stories.len()),
            AgentOutput::Code(code) => format!(
                "{} files, {} lines",
                code.files.len(),
                code.total_lines()
            ),
            AgentOutput::Tests(tests) => format!("{} test files", tests.files.len()),
            AgentOutput::TestReport(report) => match report.success {
                Some(true) => format!("tests passed ({} cases)", report.results.len()),
                Some(false) => format!("tests failed ({} failures)", report.failure_descriptions().len()),
                None => "test verdict indeterminate".to_string(),
            },
            AgentOutput::SecurityReport(report) => format!("{} risks", report.risks.len()),
        }
    }
}

/// Guess a language tag from a file extension.
pub fn language_for_path(path: &str) -> &'static str {
    let ext = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    match ext {
        "rs" => "rust",
        "py" => "python",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" | "mjs" => "javascript",
        "go" => "go",
        "java" => "java",
        "rb" => "ruby",
        "sql" => "sql",
        "json" => "json",
        "toml" => "toml",
        "yaml" | "yml" => "yaml",
        "md" => "markdown",
        _ => "text",
    }
}
