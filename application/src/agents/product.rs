//! Product agent: requirement → user stories

use super::base::{AgentCore, failure_response, vars};
use super::format::format_history;
use super::parsing::take_array;
use super::{Agent, AgentError};
use crate::ports::llm_dispatcher::LlmDispatcher;
use crate::ports::prompt_renderer::PromptRenderer;
use async_trait::async_trait;
use forge_domain::prompt::names;
use forge_domain::{
    AgentOutput, AgentResponse, AgentTask, AgentType, ConversationMessage, GenerationOptions,
    TaskInput, UserStory,
};
use std::sync::Arc;
use tracing::info;

/// Number of history messages quoted in the analysis prompt
const HISTORY_WINDOW: usize = 10;

pub struct ProductAgent {
    core: AgentCore,
}

impl ProductAgent {
    pub fn new(dispatcher: Arc<dyn LlmDispatcher>, prompts: Arc<dyn PromptRenderer>) -> Self {
        Self {
            core: AgentCore::new(AgentType::Product, dispatcher, prompts),
        }
    }

    /// Pin this agent to a specific model id
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.core.set_model(model);
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.core.set_options(options);
        self
    }

    async fn analyze(
        &self,
        requirement: &str,
        history: &[ConversationMessage],
    ) -> Result<AgentResponse, AgentError> {
        let vars = vars([
            ("requirement", requirement.to_string()),
            ("history", format_history(history, HISTORY_WINDOW)),
        ]);
        let completion = self.core.complete(names::ANALYZE_REQUIREMENTS, &vars).await?;
        let stories: Vec<UserStory> =
            take_array(&completion.json, "user_stories", &completion.llm.text)?;

        info!(stories = stories.len(), "Requirement analyzed");

        let response = if stories.is_empty() {
            let mut response = AgentResponse::requires_feedback(
                "The requirement is too vague to split into user stories; please add detail",
            );
            response.data = Some(AgentOutput::UserStories(stories));
            response
        } else {
            let message = format!("Identified {} user stories", stories.len());
            AgentResponse::success(AgentOutput::UserStories(stories), message)
        };
        Ok(completion.annotate(response))
    }
}

#[async_trait]
impl Agent for ProductAgent {
    fn agent_type(&self) -> AgentType {
        AgentType::Product
    }

    async fn handle(&self, task: &AgentTask) -> AgentResponse {
        let TaskInput::Requirements {
            requirement,
            history,
        } = &task.input
        else {
            return failure_response(
                AgentType::Product,
                AgentError::InvalidInput(format!(
                    "expected a requirement, got input for {}",
                    task.input.agent_type()
                )),
            );
        };

        if requirement.trim().is_empty() {
            return failure_response(
                AgentType::Product,
                AgentError::InvalidInput("requirement must not be empty".to_string()),
            );
        }

        match self.analyze(requirement, history).await {
            Ok(response) => response,
            Err(e) => failure_response(AgentType::Product, e),
        }
    }

    async fn is_available(&self) -> bool {
        self.core.is_available()
    }

    fn capabilities(&self) -> Vec<String> {
        vec![
            "analyze_requirements".to_string(),
            "write_user_stories".to_string(),
        ]
    }
}
