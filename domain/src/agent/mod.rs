//! Agent domain module
//!
//! Agent identities, the task/response envelope, the artifacts agents
//! produce, and the priority queue used for ancillary scheduling.

pub mod agent_type;
pub mod artifacts;
pub mod queue;
pub mod response;
pub mod task;

pub use agent_type::AgentType;
pub use artifacts::{
    AgentOutput, CodeFile, FixIssue, GeneratedCode, GeneratedTests, IssueSource, SecurityReport,
    SecurityRisk, Severity, TestCaseResult, TestReport, UserStory, language_for_path,
};
pub use queue::TaskQueue;
pub use response::{AgentResponse, ResponseStatus};
pub use task::{AgentTask, TaskInput, TaskPriority, TaskStatus, TaskType};
