//! Configuration parsing and namespace building
//!
//! This module handles parsing of tasknest.yml configuration files and
//! building the runtime namespace tree out of them.

pub mod build;
pub mod parse;
pub mod types;

// Re-export main types
pub use build::*;
pub use parse::*;
pub use types::*;
