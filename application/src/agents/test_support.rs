//! Scripted dispatcher and built-in template renderer for tests.

use crate::ports::llm_dispatcher::{
    DispatchError, GenerationError, GenerationRequest, LlmDispatcher,
};
use crate::ports::prompt_renderer::PromptRenderer;
use async_trait::async_trait;
use forge_domain::prompt::builtin_template;
use forge_domain::{AgentType, LlmResponse};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Answers each call with the next scripted text; records every request.
pub struct ScriptedDispatcher {
    replies: Mutex<VecDeque<Result<String, String>>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedDispatcher {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from(vec![Err(message.to_string())])),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_user_prompt(&self) -> String {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.prompt.user.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmDispatcher for ScriptedDispatcher {
    async fn generate(&self, request: GenerationRequest) -> Result<LlmResponse, DispatchError> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(LlmResponse::new(text, "mock-model", "mock")),
            Some(Err(message)) => Err(DispatchError::Generation {
                model: "mock:mock-model".to_string(),
                source: GenerationError::Connection(message),
            }),
            None => Err(DispatchError::NoModelAvailable),
        }
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Built-in templates with naive placeholder substitution.
pub struct BuiltinPrompts;

impl PromptRenderer for BuiltinPrompts {
    fn load_template(&self, agent: AgentType, name: &str) -> Option<String> {
        builtin_template(agent, name).map(str::to_string)
    }

    fn apply_variables(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut out = template.to_string();
        for (key, value) in vars {
            out = out.replace(&format!("{{{{{key}}}}}"), value);
        }
        out
    }
}
