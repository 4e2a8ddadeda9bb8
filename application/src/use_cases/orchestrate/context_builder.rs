//! Context propagation: assemble the typed task input for the next agent.
//!
//! The conversation history is scanned newest-first for tagged agent
//! outputs; the session context fills whatever the scan did not find.
//! Generated tests only ever live in the context.

use forge_domain::{
    AgentOutput, AgentTask, AgentType, ConversationMessage, FixIssue, GeneratedCode,
    OrchestratorState, SecurityReport, StepStatus, TaskInput, TaskType, TestReport, UserStory,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("The {agent} agent needs {missing}, but the session has none yet")]
    Missing {
        agent: AgentType,
        missing: &'static str,
    },
}

#[derive(Debug, Clone, Copy, Default)]
struct Needs {
    stories: bool,
    code: bool,
    test_report: bool,
    security_report: bool,
}

#[derive(Debug, Default)]
struct Gathered {
    stories: Option<Vec<UserStory>>,
    code: Option<GeneratedCode>,
    test_report: Option<TestReport>,
    security_report: Option<SecurityReport>,
}

impl Gathered {
    fn satisfies(&self, needs: Needs) -> bool {
        (!needs.stories || self.stories.is_some())
            && (!needs.code || self.code.is_some())
            && (!needs.test_report || self.test_report.is_some())
            && (!needs.security_report || self.security_report.is_some())
    }
}

/// Newest-first scan over the last `window` messages; stops once `needs` are met.
fn scan_history(history: &[ConversationMessage], window: usize, needs: Needs) -> Gathered {
    let mut found = Gathered::default();
    let start = history.len().saturating_sub(window);
    for message in history[start..].iter().rev() {
        if found.satisfies(needs) {
            break;
        }
        let Some(output) = &message.output else {
            continue;
        };
        match output {
            AgentOutput::UserStories(stories) if needs.stories && found.stories.is_none() => {
                if !stories.is_empty() {
                    found.stories = Some(stories.clone());
                }
            }
            AgentOutput::Code(code) if needs.code && found.code.is_none() => {
                found.code = Some(code.clone());
            }
            AgentOutput::TestReport(report) if needs.test_report && found.test_report.is_none() => {
                found.test_report = Some(report.clone());
            }
            AgentOutput::SecurityReport(report)
                if needs.security_report && found.security_report.is_none() =>
            {
                found.security_report = Some(report.clone());
            }
            _ => {}
        }
    }
    found
}

/// Why the Coder is being asked to fix rather than generate
enum FixReason {
    Security(SecurityReport),
    Test(TestReport),
}

/// Build the task for `target` from the session state and history.
pub fn build_task(
    target: AgentType,
    state: &OrchestratorState,
    history: &[ConversationMessage],
    window: usize,
) -> Result<AgentTask, ContextError> {
    let ctx = &state.context;
    let needs = Needs {
        stories: target != AgentType::Product,
        code: matches!(
            target,
            AgentType::Coder | AgentType::Test | AgentType::Security
        ),
        test_report: target == AgentType::Coder,
        security_report: target == AgentType::Coder,
    };
    let mut found = scan_history(history, window, needs);
    if found.stories.is_none() {
        found.stories = ctx.stories().map(<[UserStory]>::to_vec);
    }
    if found.code.is_none() {
        found.code = ctx.code.clone();
    }
    if found.test_report.is_none() {
        found.test_report = ctx.test_report.clone();
    }
    if found.security_report.is_none() {
        found.security_report = ctx.security_report.clone();
    }

    let missing = |missing: &'static str| ContextError::Missing {
        agent: target,
        missing,
    };

    let task = match target {
        AgentType::Product => {
            let requirement = history
                .iter()
                .rev()
                .find(|m| m.is_user())
                .map(|m| m.content.clone())
                .ok_or_else(|| missing("a requirement"))?;
            let start = history.len().saturating_sub(window);
            AgentTask::new(TaskInput::Requirements {
                requirement,
                history: history[start..].to_vec(),
            })
            .with_task_type(TaskType::Analyze)
        }
        AgentType::Coder => match fix_reason(state, &found) {
            Some(reason) => {
                let previous_code = found.code.ok_or_else(|| missing("code to fix"))?;
                let issues = match reason {
                    FixReason::Security(report) => {
                        report.risks.iter().map(FixIssue::from_risk).collect()
                    }
                    FixReason::Test(report) => report
                        .failure_descriptions()
                        .into_iter()
                        .map(FixIssue::from_test_failure)
                        .collect(),
                };
                AgentTask::new(TaskInput::FixCode {
                    user_stories: found.stories.unwrap_or_default(),
                    previous_code,
                    issues,
                })
                .with_task_type(TaskType::Fix)
            }
            None => {
                // Only a message typed by the user in this turn counts as feedback.
                let feedback = history
                    .last()
                    .filter(|m| m.is_user())
                    .map(|m| m.content.clone());
                if found.stories.is_none() && feedback.is_none() {
                    return Err(missing("user stories"));
                }
                AgentTask::new(TaskInput::GenerateCode {
                    user_stories: found.stories.unwrap_or_default(),
                    feedback,
                })
                .with_task_type(TaskType::Generate)
            }
        },
        AgentType::Test => {
            let code = found.code.ok_or_else(|| missing("generated code"))?;
            let task_type = if ctx.last_code_task == Some(TaskType::Fix) {
                TaskType::ValidateFix
            } else {
                TaskType::Simulate
            };
            AgentTask::new(TaskInput::ValidateCode {
                code,
                user_stories: found.stories.unwrap_or_default(),
                tests: ctx.generated_tests.clone(),
            })
            .with_task_type(task_type)
        }
        AgentType::Security => {
            let code = found.code.ok_or_else(|| missing("generated code"))?;
            AgentTask::new(TaskInput::AnalyzeSecurity {
                code,
                user_stories: found.stories.unwrap_or_default(),
            })
            .with_task_type(TaskType::Analyze)
        }
    };
    Ok(task)
}

/// A fix follows a completed Security step that found risks or a completed
/// Test step that failed. A step that ended in error produced no report, so
/// any report still around belongs to an earlier cycle.
fn fix_reason(state: &OrchestratorState, found: &Gathered) -> Option<FixReason> {
    let step = state
        .last_closed_step()
        .filter(|step| step.status == StepStatus::Completed)?;
    match step.agent_type {
        AgentType::Security => found
            .security_report
            .clone()
            .filter(SecurityReport::has_risks)
            .map(FixReason::Security),
        AgentType::Test => found
            .test_report
            .clone()
            .filter(|r| r.success == Some(false))
            .map(FixReason::Test),
        _ => None,
    }
}
