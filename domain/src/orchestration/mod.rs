//! Orchestration domain
//!
//! The per-session state machine and the context it accumulates.

pub mod context;
pub mod state;

pub use context::SessionContext;
pub use state::{
    OrchestratorState, OrchestratorStep, SessionStatus, StateError, StepStatus, StepUpdate,
};
