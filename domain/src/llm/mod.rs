//! LLM dispatch domain
//!
//! Provider-neutral value objects shared by the dispatcher and the
//! per-provider adapters:
//!
//! - [`ModelConfig`]: one configured backend model, ranked by priority
//! - [`GenerationOptions`]: sampling options, mergeable per request
//! - [`LlmResponse`]: the result of one successful adapter call

pub mod model_config;
pub mod response;

pub use model_config::{GenerationOptions, ModelConfig, rank_by_priority};
pub use response::{FinishReason, LlmResponse, TokenUsage};
