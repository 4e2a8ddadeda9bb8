//! Infrastructure layer for codeforge
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: LLM provider adapters and the model registry,
//! session stores, prompt template loading, the JSONL transcript logger,
//! and configuration file loading.

pub mod config;
pub mod logging;
pub mod prompts;
pub mod providers;
pub mod session;

// Re-export commonly used types
pub use config::{ConfigError, ConfigIssue, ConfigLoader, FileConfig, Severity};
pub use logging::JsonlConversationLogger;
pub use prompts::FilePromptRenderer;
pub use providers::{
    AnthropicAdapter, DEFAULT_REQUEST_TIMEOUT, ModelAdapter, ModelRegistry, ModelStatus,
    OllamaAdapter, OpenAiAdapter, default_adapters,
};
pub use session::{FileSessionStore, InMemorySessionStore};
