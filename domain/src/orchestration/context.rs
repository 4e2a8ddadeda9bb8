//! Session-level accumulated context

use crate::agent::artifacts::{
    AgentOutput, GeneratedCode, GeneratedTests, SecurityReport, TestReport, UserStory,
};
use crate::agent::task::TaskType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Latest structured output per agent, accumulated across steps.
///
/// History scanning is the primary source for task inputs; this context is
/// the fallback, and the authoritative source for auxiliary results that
/// never appear in the conversation (generated tests, auxiliary security
/// reviews).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionContext {
    pub user_stories: Option<Vec<UserStory>>,
    pub code: Option<GeneratedCode>,
    /// Task type of the step that produced `code`.
    pub last_code_task: Option<TaskType>,
    pub generated_tests: Option<GeneratedTests>,
    pub test_report: Option<TestReport>,
    pub security_report: Option<SecurityReport>,
    /// Free-form values set by callers.
    pub extra: HashMap<String, serde_json::Value>,
}

impl SessionContext {
    /// Store `output` as the latest value for its kind.
    pub fn record_output(&mut self, output: &AgentOutput, task_type: Option<TaskType>) {
        match output {
            AgentOutput::UserStories(stories) => self.user_stories = Some(stories.clone()),
            AgentOutput::Code(code) => {
                self.code = Some(code.clone());
                self.last_code_task = task_type;
            }
            AgentOutput::Tests(tests) => self.generated_tests = Some(tests.clone()),
            AgentOutput::TestReport(report) => self.test_report = Some(report.clone()),
            AgentOutput::SecurityReport(report) => self.security_report = Some(report.clone()),
        }
    }

    /// Non-empty user stories, if any.
    pub fn stories(&self) -> Option<&[UserStory]> {
        self.user_stories
            .as_deref()
            .filter(|stories| !stories.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.user_stories.is_none()
            && self.code.is_none()
            && self.generated_tests.is_none()
            && self.test_report.is_none()
            && self.security_report.is_none()
            && self.extra.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::artifacts::CodeFile;

    #[test]
    fn test_record_output_keeps_latest() {
        let mut ctx = SessionContext::default();
        ctx.record_output(
            &AgentOutput::Code(GeneratedCode::new(vec![CodeFile::new("a.py", "v1")])),
            Some(TaskType::Generate),
        );
        ctx.record_output(
            &AgentOutput::Code(GeneratedCode::new(vec![CodeFile::new("a.py", "v2")])),
            Some(TaskType::Fix),
        );
        assert_eq!(ctx.code.as_ref().unwrap().files[0].content, "v2");
        assert_eq!(ctx.last_code_task, Some(TaskType::Fix));
    }

    #[test]
    fn test_empty_stories_are_not_usable() {
        let mut ctx = SessionContext::default();
        ctx.record_output(&AgentOutput::UserStories(vec![]), None);
        assert!(ctx.stories().is_none());
        assert!(!ctx.is_empty());
    }
}
