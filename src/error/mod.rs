//! Error handling module
//!
//! Defines the declaration error taxonomy with appropriate exit codes

pub mod types;

pub use types::*;
