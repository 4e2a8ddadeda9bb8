//! Domain layer for codeforge
//!
//! This crate contains the core business entities and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Agents
//!
//! Four specialized agents (Product, Coder, Test, Security) each receive an
//! [`AgentTask`] and answer with an [`AgentResponse`]. Task inputs are a
//! tagged union so every agent receives exactly the fields it needs.
//!
//! ## Orchestration
//!
//! [`OrchestratorState`] is the per-session state machine: an append-only
//! list of [`OrchestratorStep`]s plus the [`SessionContext`] accumulated
//! from agent outputs.
//!
//! ## LLM dispatch
//!
//! [`ModelConfig`] describes a configured backend model; [`LlmResponse`] is
//! what a successful generation returns.

pub mod agent;
pub mod config;
pub mod core;
pub mod llm;
pub mod orchestration;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use agent::{
    AgentOutput, AgentResponse, AgentTask, AgentType, CodeFile, FixIssue, GeneratedCode,
    GeneratedTests, IssueSource, ResponseStatus, SecurityReport, SecurityRisk, Severity,
    TaskInput, TaskPriority, TaskQueue, TaskStatus, TaskType, TestCaseResult, TestReport,
    UserStory,
};
pub use config::OutputFormat;
pub use core::{error::DomainError, string::summarize};
pub use llm::{FinishReason, GenerationOptions, LlmResponse, ModelConfig, TokenUsage, rank_by_priority};
pub use orchestration::{
    OrchestratorState, OrchestratorStep, SessionContext, SessionStatus, StateError, StepStatus,
    StepUpdate,
};
pub use session::{ConversationMessage, MessageRole, SessionRecord};
