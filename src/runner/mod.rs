//! Namespace resolution and task execution engine
//!
//! This module holds the core of tasknest: the `Collection` namespace tree,
//! the `Task`/`Call` value objects, the `Context` configuration scope, and the
//! `Executor` that expands and runs task graphs.

pub mod collection;
pub mod command;
pub mod context;
pub mod executor;
pub mod interpolate;
pub mod task;

// Re-export main types
pub use collection::*;
pub use command::*;
pub use context::*;
pub use executor::*;
pub use interpolate::*;
pub use task::*;
