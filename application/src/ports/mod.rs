//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_logger;
pub mod llm_dispatcher;
pub mod progress;
pub mod prompt_renderer;
pub mod session_store;
