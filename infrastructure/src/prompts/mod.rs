//! Prompt template loading and rendering

pub mod file_renderer;

pub use file_renderer::FilePromptRenderer;
