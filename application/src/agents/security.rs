//! Security agent: reviews generated code for vulnerabilities

use super::base::{AgentCore, Completion, failure_response, vars};
use super::format::{format_code, format_stories};
use super::parsing::{invalid_output, string_field};
use super::{Agent, AgentError, SecurityAnalyzer};
use crate::ports::llm_dispatcher::LlmDispatcher;
use crate::ports::prompt_renderer::PromptRenderer;
use async_trait::async_trait;
use forge_domain::prompt::names;
use forge_domain::{
    AgentOutput, AgentResponse, AgentTask, AgentType, GeneratedCode, GenerationOptions,
    SecurityReport, SecurityRisk, Severity, TaskInput, UserStory,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

pub struct SecurityAgent {
    core: AgentCore,
}

impl SecurityAgent {
    pub fn new(dispatcher: Arc<dyn LlmDispatcher>, prompts: Arc<dyn PromptRenderer>) -> Self {
        Self {
            core: AgentCore::new(AgentType::Security, dispatcher, prompts),
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

    async fn review(
        &self,
        code: &GeneratedCode,
        user_stories: &[UserStory],
    ) -> Result<(SecurityReport, Completion), AgentError> {
        let vars = vars([
            ("code", format_code(code)),
            ("user_stories", format_stories(user_stories)),
        ]);
        let completion = self.core.complete(names::ANALYZE_SECURITY, &vars).await?;
        let report = parse_report(&completion.json, &completion.llm.text)?;

        info!(
            risks = report.risks.len(),
            highest = ?report.highest_severity(),
            "Security review finished"
        );
        Ok((report, completion))
    }
}

/// Map free-form severity labels onto [`Severity`]; unknown labels count as medium.
fn parse_severity(label: &str) -> Severity {
    match label.trim().to_ascii_lowercase().as_str() {
        "critical" | "blocker" => Severity::Critical,
        "high" | "severe" | "major" => Severity::High,
        "medium" | "moderate" => Severity::Medium,
        "low" | "minor" | "info" | "informational" => Severity::Low,
        other => {
            warn!(severity = other, "Unknown severity label, treating as medium");
            Severity::Medium
        }
    }
}

fn parse_risk(index: usize, value: &Value) -> Option<SecurityRisk> {
    let title = value
        .get("title")
        .and_then(Value::as_str)
        .or_else(|| value.get("description").and_then(Value::as_str))?
        .to_string();
    let id = value
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("SEC-{}", index + 1));
    let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

    Some(SecurityRisk {
        id,
        severity: text("severity")
            .map(|s| parse_severity(&s))
            .unwrap_or(Severity::Medium),
        title,
        description: text("description").unwrap_or_default(),
        file: text("file"),
        line: value
            .get("line")
            .and_then(Value::as_u64)
            .and_then(|l| u32::try_from(l).ok()),
        recommendation: text("recommendation"),
    })
}

fn parse_report(json: &Value, raw: &str) -> Result<SecurityReport, AgentError> {
    let entries = json
        .get("risks")
        .and_then(Value::as_array)
        .ok_or_else(|| invalid_output("missing array 'risks'", raw))?;

    let mut risks = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match parse_risk(index, entry) {
            Some(risk) => risks.push(risk),
            None => warn!(index, "Skipping security risk without a title"),
        }
    }

    Ok(SecurityReport {
        risks,
        summary: string_field(json, "summary"),
    })
}

#[async_trait]
impl SecurityAnalyzer for SecurityAgent {
    async fn analyze_code(
        &self,
        code: &GeneratedCode,
        user_stories: &[UserStory],
    ) -> Result<SecurityReport, AgentError> {
        if !code.is_usable() {
            return Err(AgentError::InvalidInput(
                "cannot review empty code".to_string(),
            ));
        }
        self.review(code, user_stories).await.map(|(report, _)| report)
    }
}

#[async_trait]
impl Agent for SecurityAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Security
    }

    async fn handle(&self, task: &AgentTask) -> AgentResponse {
        let TaskInput::AnalyzeSecurity { code, user_stories } = &task.input else {
            return failure_response(
                AgentType::Security,
                AgentError::InvalidInput(format!(
                    "expected code to review, got input for {}",
                    task.input.agent_type()
                )),
            );
        };

        if !code.is_usable() {
            return failure_response(
                AgentType::Security,
                AgentError::InvalidInput("code is required for a security review".to_string()),
            );
        }

        match self.review(code, user_stories).await {
            Ok((report, completion)) => {
                let output = AgentOutput::SecurityReport(report);
                let summary = output.summary();
                completion.annotate(AgentResponse::success(output, summary))
            }
            Err(e) => failure_response(AgentType::Security, e),
        }
    }

    async fn is_available(&self) -> bool {
        self.core.is_available()
    }

    fn capabilities(&self) -> Vec<String> {
        vec!["analyze_security".to_string(), "review_code".to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::test_support::{BuiltinPrompts, ScriptedDispatcher};
    use forge_domain::{CodeFile, ResponseStatus};
    use serde_json::json;

    fn agent(dispatcher: Arc<ScriptedDispatcher>) -> SecurityAgent {
        SecurityAgent::new(dispatcher, Arc::new(BuiltinPrompts))
    }

    fn code() -> GeneratedCode {
        GeneratedCode::new(vec![CodeFile::new("app.py", "SECRET = 'hunter2'")])
    }

    #[test]
    fn test_lenient_risk_parsing() {
        let value = json!({
            "risks": [
                {"severity": "High", "title": "Hardcoded secret", "file": "app.py", "line": 1},
                {"description": "No rate limiting", "severity": "moderate"},
                {"severity": "low"}
            ],
            "summary": "two issues"
        });
        let report = parse_report(&value, "").unwrap();

        assert_eq!(report.risks.len(), 2);
        assert_eq!(report.risks[0].id, "SEC-1");
        assert_eq!(report.risks[0].severity, Severity::High);
        assert_eq!(report.risks[0].line, Some(1));
        assert_eq!(report.risks[1].title, "No rate limiting");
        assert_eq!(report.risks[1].severity, Severity::Medium);
        assert_eq!(report.highest_severity(), Some(Severity::High));
    }

    #[test]
    fn test_unknown_severity_is_medium() {
        assert_eq!(parse_severity("spicy"), Severity::Medium);
        assert_eq!(parse_severity(" CRITICAL "), Severity::Critical);
    }

    #[tokio::test]
    async fn test_clean_review() {
        let dispatcher = Arc::new(ScriptedDispatcher::new(vec![
            r#"{"risks": [], "summary": "clean"}"#,
        ]));
        let task = AgentTask::new(TaskInput::AnalyzeSecurity {
            code: code(),
            user_stories: vec![],
        });
        let response = agent(dispatcher).handle(&task).await;

        assert_eq!(response.status, ResponseStatus::Success);
        assert_eq!(response.message, "0 risks");
    }

    #[tokio::test]
    async fn test_analyze_code_capability() {
        let reply = r#"{"risks": [{"id": "SEC-7", "severity": "critical", "title": "Hardcoded secret"}]}"#;
        let dispatcher = Arc::new(ScriptedDispatcher::new(vec![reply]));
        let report = agent(dispatcher).analyze_code(&code(), &[]).await.unwrap();
        assert!(report.has_risks());
        assert_eq!(report.risks[0].id, "SEC-7");
    }

    #[tokio::test]
    async fn test_missing_risks_is_error() {
        let dispatcher = Arc::new(ScriptedDispatcher::new(vec![r#"{"summary": "fine"}"#]));
        let result = agent(dispatcher).analyze_code(&code(), &[]).await;
        assert!(matches!(result, Err(AgentError::InvalidOutput { .. })));
    }
}
