//! Application layer for codeforge
//!
//! This crate contains the agents, the orchestration use case, port
//! definitions, and application configuration.
//! It depends only on the domain layer.

pub mod agents;
pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use agents::{
    Agent, AgentError, AgentRoster, CoderAgent, ProductAgent, SecurityAgent, SecurityAnalyzer,
    TestAgent, TestGenerator,
};
pub use config::OrchestratorConfig;
pub use ports::{
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_dispatcher::{DispatchError, GenerationError, GenerationRequest, LlmDispatcher, Prompt},
    progress::{NoProgress, ProgressNotifier},
    prompt_renderer::PromptRenderer,
    session_store::{SessionStore, SessionStoreError},
};
pub use use_cases::orchestrate::{
    OrchestrateUseCase, OrchestratorError, TurnInput, TurnOutcome,
    auxiliary::{AuxiliaryKind, plan_auxiliary, run_auxiliary},
    context_builder::{ContextError, build_task},
    continuation::{determine_continuation_agent, determine_continuation_by_name},
    routing::{ROUTING_RULES, route_user_message},
};
