//! Session domain module
//!
//! Conversation history and the record persisted per session.

pub mod message;
pub mod record;

pub use message::{ConversationMessage, MessageRole};
pub use record::SessionRecord;
