//! Agent task entity
//!
//! An [`AgentTask`] is created fresh for every orchestrator step. Its
//! [`TaskInput`] is a tagged union carrying exactly the fields the target
//! agent needs for the given kind of work.

use super::agent_type::AgentType;
use super::artifacts::{FixIssue, GeneratedCode, GeneratedTests, UserStory};
use crate::core::error::DomainError;
use crate::session::message::ConversationMessage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of work requested from an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Generate,
    Fix,
    Analyze,
    Simulate,
    Validate,
    ValidateFix,
}

impl TaskType {
    pub fn as_str(&self) -> &str {
        match self {
            TaskType::Generate => "generate",
            TaskType::Fix => "fix",
            TaskType::Analyze => "analyze",
            TaskType::Simulate => "simulate",
            TaskType::Validate => "validate",
            TaskType::ValidateFix => "validate_fix",
        }
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generate" => Ok(TaskType::Generate),
            "fix" => Ok(TaskType::Fix),
            "analyze" => Ok(TaskType::Analyze),
            "simulate" => Ok(TaskType::Simulate),
            "validate" => Ok(TaskType::Validate),
            "validate_fix" => Ok(TaskType::ValidateFix),
            other => Err(DomainError::UnknownTaskType(other.to_string())),
        }
    }
}

/// Lifecycle of a single task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }
}

/// Scheduling priority. Higher variants run first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

/// Input for a task, one variant per (agent, kind of work).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum TaskInput {
    /// Product: analyze a requirement into user stories.
    Requirements {
        requirement: String,
        history: Vec<ConversationMessage>,
    },
    /// Coder: implement the given stories.
    GenerateCode {
        user_stories: Vec<UserStory>,
        feedback: Option<String>,
    },
    /// Coder: repair previously generated code.
    FixCode {
        user_stories: Vec<UserStory>,
        previous_code: GeneratedCode,
        issues: Vec<FixIssue>,
    },
    /// Test: validate generated code against the stories, using the
    /// generated test files when they exist.
    ValidateCode {
        code: GeneratedCode,
        user_stories: Vec<UserStory>,
        tests: Option<GeneratedTests>,
    },
    /// Security: review generated code.
    AnalyzeSecurity {
        code: GeneratedCode,
        user_stories: Vec<UserStory>,
    },
}

impl TaskInput {
    /// The agent this input is addressed to.
    pub fn agent_type(&self) -> AgentType {
        match self {
            TaskInput::Requirements { .. } => AgentType::Product,
            TaskInput::GenerateCode { .. } | TaskInput::FixCode { .. } => AgentType::Coder,
            TaskInput::ValidateCode { .. } => AgentType::Test,
            TaskInput::AnalyzeSecurity { .. } => AgentType::Security,
        }
    }

    pub fn default_task_type(&self) -> TaskType {
        match self {
            TaskInput::Requirements { .. } => TaskType::Analyze,
            TaskInput::GenerateCode { .. } => TaskType::Generate,
            TaskInput::FixCode { .. } => TaskType::Fix,
            TaskInput::ValidateCode { .. } => TaskType::Simulate,
            TaskInput::AnalyzeSecurity { .. } => TaskType::Analyze,
        }
    }

    /// Short description recorded as the step's input summary.
    pub fn summary(&self) -> String {
        match self {
            TaskInput::Requirements { requirement, .. } => {
                crate::core::string::summarize(requirement, 120)
            }
            TaskInput::GenerateCode { user_stories, .. } => {
                format!("implement {} user stories", user_stories.len())
            }
            TaskInput::FixCode {
                previous_code,
                issues,
                ..
            } => format!(
                "fix {} issues across {} files",
                issues.len(),
                previous_code.files.len()
            ),
            TaskInput::ValidateCode { code, .. } => {
                format!("validate {} files", code.files.len())
            }
            TaskInput::AnalyzeSecurity { code, .. } => {
                format!("review {} files", code.files.len())
            }
        }
    }
}

/// A unit of work for one agent (Entity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTask {
    pub id: String,
    pub agent_type: AgentType,
    pub input: TaskInput,
    pub task_type: Option<TaskType>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentTask {
    /// Create a pending task; the agent type and task type follow from the input.
    pub fn new(input: TaskInput) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            agent_type: input.agent_type(),
            task_type: Some(input.default_task_type()),
            input,
            priority: TaskPriority::Normal,
            status: TaskStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_task_type(mut self, task_type: TaskType) -> Self {
        self.task_type = Some(task_type);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn is_fix(&self) -> bool {
        matches!(self.task_type, Some(TaskType::Fix))
    }

    pub fn mark_in_progress(&mut self) {
        self.transition(TaskStatus::InProgress);
    }

    pub fn mark_completed(&mut self) {
        self.transition(TaskStatus::Completed);
    }

    pub fn mark_failed(&mut self) {
        self.transition(TaskStatus::Failed);
    }

    fn transition(&mut self, status: TaskStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::artifacts::CodeFile;

    #[test]
    fn test_agent_type_follows_input() {
        let task = AgentTask::new(TaskInput::ValidateCode {
            code: GeneratedCode::new(vec![CodeFile::new("app.py", "print(1)")]),
            user_stories: vec![],
            tests: None,
        });
        assert_eq!(task.agent_type, AgentType::Test);
        assert_eq!(task.task_type, Some(TaskType::Simulate));
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_fix_task_type() {
        let task = AgentTask::new(TaskInput::FixCode {
            user_stories: vec![],
            previous_code: GeneratedCode::default(),
            issues: vec![FixIssue::from_test_failure("create returns 500")],
        });
        assert!(task.is_fix());
        assert_eq!(task.input.summary(), "fix 1 issues across 0 files");
    }

    #[test]
    fn test_task_ids_are_unique() {
        let input = TaskInput::GenerateCode {
            user_stories: vec![],
            feedback: None,
        };
        let a = AgentTask::new(input.clone());
        let b = AgentTask::new(input);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_status_transitions() {
        let mut task = AgentTask::new(TaskInput::GenerateCode {
            user_stories: vec![],
            feedback: None,
        });
        task.mark_in_progress();
        assert!(!task.status.is_terminal());
        task.mark_failed();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.status.is_terminal());
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn test_task_type_parse() {
        assert_eq!("validate_fix".parse::<TaskType>().unwrap(), TaskType::ValidateFix);
        assert!("deploy".parse::<TaskType>().is_err());
    }

    #[test]
    fn test_priority_ordering() {
        assert!(TaskPriority::Critical > TaskPriority::High);
        assert!(TaskPriority::Normal > TaskPriority::Low);
    }
}
