//! CLI interface and argument parsing
//!
//! This module turns collection metadata into a clap command tree, handles
//! argument parsing, and drives the executor.

pub mod app;

// Re-export main types
pub use app::*;
