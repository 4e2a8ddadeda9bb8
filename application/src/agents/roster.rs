//! The set of agents available to the orchestrator

use super::{
    Agent, CoderAgent, ProductAgent, SecurityAgent, SecurityAnalyzer, TestAgent, TestGenerator,
};
use crate::ports::llm_dispatcher::LlmDispatcher;
use crate::ports::prompt_renderer::PromptRenderer;
use forge_domain::AgentType;
use std::collections::HashMap;
use std::sync::Arc;

/// Agents by type, plus the narrow capabilities used for auxiliary tasks.
#[derive(Default, Clone)]
pub struct AgentRoster {
    agents: HashMap<AgentType, Arc<dyn Agent>>,
    test_generator: Option<Arc<dyn TestGenerator>>,
    security_analyzer: Option<Arc<dyn SecurityAnalyzer>>,
}

impl AgentRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// All four standard agents over one dispatcher.
    ///
    /// `models` pins individual agents to a model id; agents without an
    /// entry use the dispatcher's priority fallback.
    pub fn standard(
        dispatcher: Arc<dyn LlmDispatcher>,
        prompts: Arc<dyn PromptRenderer>,
        models: &HashMap<AgentType, String>,
    ) -> Self {
        let mut product = ProductAgent::new(dispatcher.clone(), prompts.clone());
        let mut coder = CoderAgent::new(dispatcher.clone(), prompts.clone());
        let mut tester = TestAgent::new(dispatcher.clone(), prompts.clone());
        let mut security = SecurityAgent::new(dispatcher, prompts);

        if let Some(model) = models.get(&AgentType::Product) {
            product = product.with_model(model.clone());
        }
        if let Some(model) = models.get(&AgentType::Coder) {
            coder = coder.with_model(model.clone());
        }
        if let Some(model) = models.get(&AgentType::Test) {
            tester = tester.with_model(model.clone());
        }
        if let Some(model) = models.get(&AgentType::Security) {
            security = security.with_model(model.clone());
        }

        let tester = Arc::new(tester);
        let security = Arc::new(security);
        Self::new()
            .with_agent(Arc::new(product))
            .with_agent(Arc::new(coder))
            .with_agent(tester.clone())
            .with_agent(security.clone())
            .with_test_generator(tester)
            .with_security_analyzer(security)
    }

    pub fn with_agent(mut self, agent: Arc<dyn Agent>) -> Self {
        self.agents.insert(agent.agent_type(), agent);
        self
    }

    pub fn with_test_generator(mut self, generator: Arc<dyn TestGenerator>) -> Self {
        self.test_generator = Some(generator);
        self
    }

    pub fn with_security_analyzer(mut self, analyzer: Arc<dyn SecurityAnalyzer>) -> Self {
        self.security_analyzer = Some(analyzer);
        self
    }

    pub fn get(&self, agent_type: AgentType) -> Option<&Arc<dyn Agent>> {
        self.agents.get(&agent_type)
    }

    pub fn test_generator(&self) -> Option<&Arc<dyn TestGenerator>> {
        self.test_generator.as_ref()
    }

    pub fn security_analyzer(&self) -> Option<&Arc<dyn SecurityAnalyzer>> {
        self.security_analyzer.as_ref()
    }

    /// Registered agent types in pipeline order
    pub fn agent_types(&self) -> Vec<AgentType> {
        AgentType::ALL
            .into_iter()
            .filter(|t| self.agents.contains_key(t))
            .collect()
    }
}
