//! LLM dispatch port
//!
//! Defines how agents ask for a generation without knowing which backend
//! serves it. The implementation (model registry with priority fallback)
//! lives in the infrastructure layer.

use async_trait::async_trait;
use forge_domain::{GenerationOptions, LlmResponse};
use thiserror::Error;

/// Errors raised by a single model adapter call
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Missing API key (set {0})")]
    MissingApiKey(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("No adapter registered for provider: {0}")]
    UnknownProvider(String),
}

/// Errors raised by the dispatcher
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("No model available")]
    NoModelAvailable,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Model {model} failed: {source}")]
    Generation {
        model: String,
        #[source]
        source: GenerationError,
    },
}

impl DispatchError {
    /// The underlying adapter error, if a model was actually contacted
    pub fn generation_error(&self) -> Option<&GenerationError> {
        match self {
            DispatchError::Generation { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A system + user prompt pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
}

impl Prompt {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

impl From<&str> for Prompt {
    fn from(user: &str) -> Self {
        Prompt::new(user)
    }
}

/// One generation request.
///
/// With `model` set, the dispatcher uses exactly that model (looked up
/// among all configured models). Without it, the dispatcher walks the
/// available models in priority order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationRequest {
    pub prompt: Prompt,
    pub model: Option<String>,
    pub options: GenerationOptions,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<Prompt>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }
}

/// Dispatcher used by agents to reach an LLM
#[async_trait]
pub trait LlmDispatcher: Send + Sync {
    /// Generate a completion, falling back across models when none is pinned
    async fn generate(&self, request: GenerationRequest) -> Result<LlmResponse, DispatchError>;

    /// True iff at least one configured model is currently available
    fn is_available(&self) -> bool;
}
