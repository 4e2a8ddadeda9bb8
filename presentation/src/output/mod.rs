//! Rendering of turn outcomes

pub mod console;
