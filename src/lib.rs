//! Tasknest - a namespace-aware task runner
//!
//! Tasknest resolves dotted task names through a tree of namespaces, expands
//! declared pre-tasks, deduplicates the resulting run, and executes it
//! sequentially with a per-task configuration scope. Tasks can be defined in
//! plain Rust through [`runner::Task`] and composed into [`runner::Collection`]
//! trees, or loaded from a tasknest.yml file.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;

// Re-export commonly used types
pub use error::{Result, TasknestError};

/// Current version of Tasknest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
