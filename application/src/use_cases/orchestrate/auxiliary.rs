//! Auxiliary task runner.
//!
//! After a primary success some agents trigger a coupled secondary
//! capability: Coder output gets tests generated for it, and a Test
//! validation gets a security review of the same code. A failed
//! auxiliary job fails the primary step.

use crate::agents::AgentRoster;
use crate::ports::progress::ProgressNotifier;
use forge_domain::{
    AgentOutput, AgentResponse, AgentType, GeneratedCode, SessionContext, TaskPriority, TaskQueue,
    UserStory,
};
use tracing::{info, warn};

/// Kind of auxiliary job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryKind {
    GenerateTests,
    AnalyzeSecurity,
}

impl AuxiliaryKind {
    pub fn as_str(&self) -> &str {
        match self {
            AuxiliaryKind::GenerateTests => "generate_tests",
            AuxiliaryKind::AnalyzeSecurity => "analyze_security",
        }
    }
}

impl std::fmt::Display for AuxiliaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One scheduled auxiliary job with its inputs
#[derive(Debug, Clone)]
pub struct AuxiliaryJob {
    pub kind: AuxiliaryKind,
    pub code: GeneratedCode,
    pub user_stories: Vec<UserStory>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuxiliaryFailure {
    pub kind: AuxiliaryKind,
    pub reason: String,
}

impl std::fmt::Display for AuxiliaryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Auxiliary task {} failed: {}", self.kind, self.reason)
    }
}

/// What the auxiliary run produced
#[derive(Debug, Clone, Default)]
pub struct AuxiliaryReport {
    pub outputs: Vec<(AuxiliaryKind, AgentOutput)>,
    pub failure: Option<AuxiliaryFailure>,
}

impl AuxiliaryReport {
    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty() && self.failure.is_none()
    }
}

/// Decide which auxiliary jobs a successful primary response triggers.
///
/// `context` is the session context from before the primary output was
/// recorded, so "prior" stories and code mean what the session had.
pub fn plan_auxiliary(
    agent: AgentType,
    response: &AgentResponse,
    context: &SessionContext,
) -> TaskQueue<AuxiliaryJob> {
    let mut queue = TaskQueue::new();
    if !response.is_success() {
        return queue;
    }

    match (agent, &response.data) {
        (AgentType::Coder, Some(AgentOutput::Code(code))) if code.is_usable() => {
            if let Some(stories) = context.stories() {
                queue.push(
                    TaskPriority::High,
                    AuxiliaryJob {
                        kind: AuxiliaryKind::GenerateTests,
                        code: code.clone(),
                        user_stories: stories.to_vec(),
                    },
                );
            }
        }
        (AgentType::Test, _) => {
            let prior = context.code.as_ref().zip(context.stories());
            if let Some((code, stories)) = prior {
                queue.push(
                    TaskPriority::Normal,
                    AuxiliaryJob {
                        kind: AuxiliaryKind::AnalyzeSecurity,
                        code: code.clone(),
                        user_stories: stories.to_vec(),
                    },
                );
            }
        }
        _ => {}
    }
    queue
}

/// Run queued jobs in priority order. The first failure stops the run.
pub async fn run_auxiliary(
    mut queue: TaskQueue<AuxiliaryJob>,
    roster: &AgentRoster,
    progress: &dyn ProgressNotifier,
) -> AuxiliaryReport {
    let mut report = AuxiliaryReport::default();

    while let Some(job) = queue.pop() {
        progress.on_auxiliary_start(job.kind.as_str());
        let result = run_job(&job, roster).await;
        progress.on_auxiliary_complete(job.kind.as_str(), result.is_ok());

        match result {
            Ok(output) => {
                info!(kind = %job.kind, summary = %output.summary(), "Auxiliary task completed");
                report.outputs.push((job.kind, output));
            }
            Err(reason) => {
                warn!(kind = %job.kind, reason = %reason, "Auxiliary task failed");
                report.failure = Some(AuxiliaryFailure {
                    kind: job.kind,
                    reason,
                });
                break;
            }
        }
    }
    report
}

async fn run_job(job: &AuxiliaryJob, roster: &AgentRoster) -> Result<AgentOutput, String> {
    match job.kind {
        AuxiliaryKind::GenerateTests => {
            let generator = roster
                .test_generator()
                .ok_or_else(|| "no test generator is registered".to_string())?;
            let tests = generator
                .generate_tests(&job.code, &job.user_stories)
                .await
                .map_err(|e| e.to_string())?;
            if !tests.is_usable() {
                return Err("no test files were generated".to_string());
            }
            Ok(AgentOutput::Tests(tests))
        }
        AuxiliaryKind::AnalyzeSecurity => {
            let analyzer = roster
                .security_analyzer()
                .ok_or_else(|| "no security analyzer is registered".to_string())?;
            let report = analyzer
                .analyze_code(&job.code, &job.user_stories)
                .await
                .map_err(|e| e.to_string())?;
            Ok(AgentOutput::SecurityReport(report))
        }
    }
}
