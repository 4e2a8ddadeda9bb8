//! Step progress display

pub mod reporter;
