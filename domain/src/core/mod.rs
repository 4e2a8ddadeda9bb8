//! Core domain concepts shared across all subdomains.
//!
//! - [`error::DomainError`]: domain-level errors
//! - [`string::summarize`]: whitespace-collapsing summaries for step records

pub mod error;
pub mod string;
