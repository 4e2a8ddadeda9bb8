//! Prompt domain
//!
//! Built-in templates for each agent's prompts.

pub mod template;

pub use template::{builtin_template, names};
