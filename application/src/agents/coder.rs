//! Coder agent: user stories → code, and code + issues → fixed code

use super::base::{AgentCore, Completion, failure_response, vars};
use super::format::{format_code, format_issues, format_stories};
use super::parsing::{invalid_output, string_field, take_array};
use super::{Agent, AgentError};
use crate::ports::llm_dispatcher::LlmDispatcher;
use crate::ports::prompt_renderer::PromptRenderer;
use async_trait::async_trait;
use forge_domain::agent::language_for_path;
use forge_domain::prompt::names;
use forge_domain::{
    AgentOutput, AgentResponse, AgentTask, AgentType, CodeFile, FixIssue, GeneratedCode,
    GenerationOptions, TaskInput, UserStory,
};
use std::sync::Arc;
use tracing::info;

pub struct CoderAgent {
    core: AgentCore,
}

impl CoderAgent {
    pub fn new(dispatcher: Arc<dyn LlmDispatcher>, prompts: Arc<dyn PromptRenderer>) -> Self {
        Self {
            core: AgentCore::new(AgentType::Coder, dispatcher, prompts),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.core.set_model(model);
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.core.set_options(options);
        self
    }

    async fn generate(
        &self,
        user_stories: &[UserStory],
        feedback: Option<&str>,
    ) -> Result<AgentResponse, AgentError> {
        let vars = vars([
            ("user_stories", format_stories(user_stories)),
            ("feedback", feedback.unwrap_or("(none)").to_string()),
        ]);
        let completion = self.core.complete(names::GENERATE_CODE, &vars).await?;
        let code = parse_code(&completion)?;

        info!(files = code.files.len(), lines = code.total_lines(), "Code generated");
        Ok(finish(&completion, code, "Generated"))
    }

    async fn fix(
        &self,
        user_stories: &[UserStory],
        previous: &GeneratedCode,
        issues: &[FixIssue],
    ) -> Result<AgentResponse, AgentError> {
        let vars = vars([
            ("user_stories", format_stories(user_stories)),
            ("code", format_code(previous)),
            ("issues", format_issues(issues)),
        ]);
        let completion = self.core.complete(names::FIX_CODE, &vars).await?;
        let fixed = parse_code(&completion)?;
        let merged = merge_fix(previous, fixed);

        info!(issues = issues.len(), files = merged.files.len(), "Code fixed");
        Ok(finish(&completion, merged, "Fixed"))
    }
}

fn parse_code(completion: &Completion) -> Result<GeneratedCode, AgentError> {
    let raw = &completion.llm.text;
    let mut files: Vec<CodeFile> = take_array(&completion.json, "files", raw)?;
    for file in &mut files {
        if file.language.is_empty() {
            file.language = language_for_path(&file.path).to_string();
        }
    }
    let code = GeneratedCode {
        files,
        explanation: string_field(&completion.json, "explanation"),
    };
    if !code.is_usable() {
        return Err(invalid_output("no non-empty code files", raw));
    }
    Ok(code)
}

/// Fixed files replace their previous version by path; untouched files are kept.
fn merge_fix(previous: &GeneratedCode, fixed: GeneratedCode) -> GeneratedCode {
    let mut files: Vec<CodeFile> = previous
        .files
        .iter()
        .filter(|old| !fixed.files.iter().any(|new| new.path == old.path))
        .cloned()
        .collect();
    let order: Vec<&str> = previous.files.iter().map(|f| f.path.as_str()).collect();
    files.extend(fixed.files);
    files.sort_by_key(|f| {
        order
            .iter()
            .position(|p| *p == f.path)
            .unwrap_or(usize::MAX)
    });
    GeneratedCode {
        files,
        explanation: fixed.explanation,
    }
}

/// Truncated output still carries code, but the chain should not continue on it.
fn finish(completion: &Completion, code: GeneratedCode, verb: &str) -> AgentResponse {
    let message = format!("{verb} {} files", code.files.len());
    let response = if completion.llm.is_truncated() {
        AgentResponse::partial(
            AgentOutput::Code(code),
            format!("{message} (output truncated by the model)"),
        )
    } else {
        AgentResponse::success(AgentOutput::Code(code), message)
    };
    completion.annotate(response)
}

#[async_trait]
impl Agent for CoderAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Coder
    }

    async fn handle(&self, task: &AgentTask) -> AgentResponse {
        let result = match &task.input {
            TaskInput::GenerateCode {
                user_stories,
                feedback,
            } => {
                if user_stories.is_empty() && feedback.is_none() {
                    Err(AgentError::InvalidInput(
                        "user stories are required to generate code".to_string(),
                    ))
                } else {
                    self.generate(user_stories, feedback.as_deref()).await
                }
            }
            TaskInput::FixCode {
                user_stories,
                previous_code,
                issues,
            } => {
                if previous_code.files.is_empty() {
                    Err(AgentError::InvalidInput(
                        "previous code is required to apply a fix".to_string(),
                    ))
                } else {
                    self.fix(user_stories, previous_code, issues).await
                }
            }
            other => Err(AgentError::InvalidInput(format!(
                "expected a code task, got input for {}",
                other.agent_type()
            ))),
        };

        result.unwrap_or_else(|e| failure_response(AgentType::Coder, e))
    }

    async fn is_available(&self) -> bool {
        self.core.is_available()
    }

    fn capabilities(&self) -> Vec<String> {
        vec!["generate_code".to_string(), "fix_code".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::test_support::{BuiltinPrompts, ScriptedDispatcher};
    use forge_domain::ResponseStatus;

    const CODE_REPLY: &str = r#"{"files": [{"path": "app.py", "content": "from flask import Flask\napp = Flask(__name__)"}], "explanation": "Flask app"}"#;

    fn agent(dispatcher: Arc<ScriptedDispatcher>) -> CoderAgent {
        CoderAgent::new(dispatcher, Arc::new(BuiltinPrompts))
    }

    fn stories() -> Vec<UserStory> {
        vec![UserStory::new("US-1", "Create todo")]
    }

    #[tokio::test]
    async fn test_generate_infers_language() {
        let dispatcher = Arc::new(ScriptedDispatcher::new(vec![CODE_REPLY]));
        let task = AgentTask::new(TaskInput::GenerateCode {
            user_stories: stories(),
            feedback: None,
        });
        let response = agent(dispatcher.clone()).handle(&task).await;

        assert_eq!(response.status, ResponseStatus::Success);
        let Some(AgentOutput::Code(code)) = response.data else {
            panic!("expected code");
        };
        assert_eq!(code.files[0].language, "python");
        assert_eq!(code.explanation, "Flask app");
        assert!(dispatcher.last_user_prompt().contains("[US-1] Create todo"));
    }

    #[tokio::test]
    async fn test_generate_without_stories_is_rejected() {
        let dispatcher = Arc::new(ScriptedDispatcher::new(vec![CODE_REPLY]));
        let task = AgentTask::new(TaskInput::GenerateCode {
            user_stories: vec![],
            feedback: None,
        });
        let response = agent(dispatcher.clone()).handle(&task).await;
        assert_eq!(response.status, ResponseStatus::Error);
        assert_eq!(dispatcher.request_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_files_is_error() {
        let dispatcher = Arc::new(ScriptedDispatcher::new(vec![r#"{"files": []}"#]));
        let task = AgentTask::new(TaskInput::GenerateCode {
            user_stories: stories(),
            feedback: None,
        });
        let response = agent(dispatcher).handle(&task).await;
        assert_eq!(response.status, ResponseStatus::Error);
        assert!(response.message.contains("no non-empty code files"));
    }

    #[tokio::test]
    async fn test_fix_merges_untouched_files() {
        let previous = GeneratedCode::new(vec![
            CodeFile::new("app.py", "old app"),
            CodeFile::new("db.py", "db layer"),
        ]);
        let reply = r#"{"files": [{"path": "app.py", "content": "new app"}], "explanation": "validated input"}"#;
        let dispatcher = Arc::new(ScriptedDispatcher::new(vec![reply]));
        let task = AgentTask::new(TaskInput::FixCode {
            user_stories: stories(),
            previous_code: previous,
            issues: vec![FixIssue::from_test_failure("delete returns 500")],
        });
        let response = agent(dispatcher.clone()).handle(&task).await;

        assert_eq!(response.status, ResponseStatus::Success);
        let Some(AgentOutput::Code(code)) = response.data else {
            panic!("expected code");
        };
        let paths: Vec<_> = code.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["app.py", "db.py"]);
        assert_eq!(code.files[0].content, "new app");
        assert!(dispatcher.last_user_prompt().contains("1. [test] delete returns 500"));
    }

    #[tokio::test]
    async fn test_dispatch_failure_becomes_error_response() {
        let dispatcher = Arc::new(ScriptedDispatcher::failing("connection refused"));
        let task = AgentTask::new(TaskInput::GenerateCode {
            user_stories: stories(),
            feedback: None,
        });
        let response = agent(dispatcher).handle(&task).await;
        assert_eq!(response.status, ResponseStatus::Error);
        assert_eq!(response.metadata["error_kind"], "dispatch");
    }
}
