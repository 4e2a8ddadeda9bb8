//! Shared plumbing for the concrete agents: render, dispatch, parse.

use super::AgentError;
use super::parsing::require_json;
use crate::ports::llm_dispatcher::{GenerationRequest, LlmDispatcher, Prompt};
use crate::ports::prompt_renderer::PromptRenderer;
use forge_domain::prompt::names;
use forge_domain::{AgentResponse, AgentType, GenerationOptions, LlmResponse};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A parsed model answer together with the raw response it came from
pub(crate) struct Completion {
    pub json: Value,
    pub llm: LlmResponse,
}

impl Completion {
    /// Attach model provenance to a response
    pub fn annotate(&self, response: AgentResponse) -> AgentResponse {
        response
            .with_metadata("model", self.llm.model.clone())
            .with_metadata("provider", self.llm.provider.clone())
            .with_metadata("prompt_tokens", self.llm.usage.prompt_tokens)
            .with_metadata("completion_tokens", self.llm.usage.completion_tokens)
            .with_metadata("finish_reason", self.llm.finish_reason.as_str())
    }
}

pub(crate) struct AgentCore {
    agent_type: AgentType,
    dispatcher: Arc<dyn LlmDispatcher>,
    prompts: Arc<dyn PromptRenderer>,
    model: Option<String>,
    options: GenerationOptions,
}

impl AgentCore {
    pub fn new(
        agent_type: AgentType,
        dispatcher: Arc<dyn LlmDispatcher>,
        prompts: Arc<dyn PromptRenderer>,
    ) -> Self {
        Self {
            agent_type,
            dispatcher,
            prompts,
            model: None,
            options: GenerationOptions::default(),
        }
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = Some(model.into());
    }

    pub fn set_options(&mut self, options: GenerationOptions) {
        self.options = options;
    }

    pub fn is_available(&self) -> bool {
        self.dispatcher.is_available()
    }

    /// Render the system template plus the named task template.
    pub fn build_prompt(
        &self,
        template: &str,
        vars: &HashMap<String, String>,
    ) -> Result<Prompt, AgentError> {
        let user = self
            .prompts
            .render(self.agent_type, template, vars)
            .ok_or_else(|| AgentError::TemplateNotFound {
                agent: self.agent_type,
                name: template.to_string(),
            })?;
        let mut prompt = Prompt::new(user);
        if let Some(system) = self.prompts.render(self.agent_type, names::SYSTEM, vars) {
            prompt = prompt.with_system(system);
        }
        Ok(prompt)
    }

    /// Render, dispatch and extract the JSON object from the answer.
    pub async fn complete(
        &self,
        template: &str,
        vars: &HashMap<String, String>,
    ) -> Result<Completion, AgentError> {
        let prompt = self.build_prompt(template, vars)?;
        let mut request = GenerationRequest::new(prompt).with_options(self.options.clone());
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        debug!(agent = %self.agent_type, template, "Dispatching prompt");
        let llm = self.dispatcher.generate(request).await?;
        if llm.is_truncated() {
            warn!(agent = %self.agent_type, model = %llm.model, "Model output was truncated");
        }

        let json = require_json(&llm.text)?;
        Ok(Completion { json, llm })
    }
}

/// Fold an agent error into the uniform error response
pub(crate) fn failure_response(agent: AgentType, err: AgentError) -> AgentResponse {
    warn!(agent = %agent, error = %err, "Agent task failed");
    let kind = match &err {
        AgentError::InvalidInput(_) => "invalid_input",
        AgentError::TemplateNotFound { .. } => "template_not_found",
        AgentError::Dispatch(_) => "dispatch",
        AgentError::InvalidOutput { .. } => "invalid_output",
    };
    AgentResponse::error(err.to_string()).with_metadata("error_kind", kind)
}

/// Variables map from `(name, value)` pairs
pub(crate) fn vars<const N: usize>(pairs: [(&str, String); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}
