//! Application-level configuration.
//!
//! - [`OrchestratorConfig`]: turn chaining, history window, auxiliary jobs

pub mod orchestrator;

pub use orchestrator::OrchestratorConfig;
