//! Error types for Tasknest

use std::io;
use thiserror::Error;

/// Result type alias for Tasknest operations
pub type Result<T> = std::result::Result<T, TasknestError>;

/// Main error type for Tasknest
#[derive(Error, Debug)]
pub enum TasknestError {
    /// Namespace registration errors
    #[error("Registration error: {0}")]
    Registry(#[from] RegistryError),

    /// Task name resolution errors
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors raised while registering tasks and subcollections
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Cannot register without a name (no explicit name and no declared name)")]
    MissingName,

    #[error("Name '{0}' already denotes a different kind of entry in this collection")]
    NameConflict(String),

    #[error("Collection already has default entry '{existing}'; cannot also default '{proposed}'")]
    MultipleDefaults { existing: String, proposed: String },
}

/// Errors raised while resolving a dotted task path
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Task '{0}' is not defined")]
    TaskNotFound(String),

    #[error("No default task set for '{0}'")]
    NoDefaultTask(String),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Opaque propagation of whatever a task body raised
    #[error("Task '{name}' failed: {source}")]
    TaskFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Configuration file parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task '{task}' declares unknown pre-task '{pre}'")]
    UnknownPreTask { task: String, pre: String },

    #[error("Circular pre-task dependency detected: {0}")]
    CircularDependency(String),
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Invalid interpolation syntax: {0}")]
    InvalidSyntax(String),
}

/// Specialized result type for registration operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Specialized result type for resolution operations
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;
