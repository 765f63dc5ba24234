//! Configuration scope passed into contextualized tasks
//!
//! A `Context` is a flat key/value configuration map. The executor clones its
//! base context for every contextualized task and merges in the namespace
//! configuration for the path the task was reached through, so no two task
//! invocations ever share a merged scope.

use std::collections::HashMap;

/// Output verbosity level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Only command output and errors
    Quiet,

    /// Standard output
    #[default]
    Normal,

    /// Verbose output
    Verbose,
}

/// A cloneable, mergeable configuration scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    /// Configuration values
    config: HashMap<String, String>,

    /// Output verbosity carried alongside configuration
    verbosity: Verbosity,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Context::default()
    }

    /// Create a context seeded with configuration values
    pub fn with_config(mut self, config: HashMap<String, String>) -> Self {
        self.config = config;
        self
    }

    /// Get a configuration value
    pub fn get(&self, key: &str) -> Option<&String> {
        self.config.get(key)
    }

    /// Set a single configuration value
    pub fn set(&mut self, key: String, value: String) {
        self.config.insert(key, value);
    }

    /// Merge configuration values into this context, incoming keys winning
    pub fn update(&mut self, values: HashMap<String, String>) {
        self.config.extend(values);
    }

    /// All configuration values currently in scope
    pub fn config(&self) -> &HashMap<String, String> {
        &self.config
    }

    /// Set the verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// The verbosity level
    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_context_new_is_empty() {
        let ctx = Context::new();
        assert!(ctx.config().is_empty());
    }

    #[test]
    fn test_context_set_and_get() {
        let mut ctx = Context::new();
        ctx.set("key".to_string(), "value".to_string());
        assert_eq!(ctx.get("key"), Some(&"value".to_string()));
    }

    #[test]
    fn test_update_overrides_existing_keys() {
        let mut ctx = Context::new().with_config(map(&[("a", "1"), ("b", "2")]));
        ctx.update(map(&[("a", "override"), ("c", "3")]));

        assert_eq!(ctx.get("a"), Some(&"override".to_string()));
        assert_eq!(ctx.get("b"), Some(&"2".to_string()));
        assert_eq!(ctx.get("c"), Some(&"3".to_string()));
    }

    #[test]
    fn test_verbosity_defaults_to_normal() {
        let ctx = Context::new();
        assert_eq!(ctx.verbosity(), Verbosity::Normal);
    }

    #[test]
    fn test_with_verbosity() {
        let ctx = Context::new().with_verbosity(Verbosity::Verbose);
        assert_eq!(ctx.verbosity(), Verbosity::Verbose);
    }

    #[test]
    fn test_verbosity_levels_are_ordered() {
        assert!(Verbosity::Quiet < Verbosity::Normal);
        assert!(Verbosity::Normal < Verbosity::Verbose);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut ctx = Context::new().with_config(map(&[("a", "1")]));
        let mut copy = ctx.clone();

        copy.set("a".to_string(), "changed".to_string());
        ctx.set("b".to_string(), "2".to_string());

        assert_eq!(ctx.get("a"), Some(&"1".to_string()));
        assert_eq!(copy.get("a"), Some(&"changed".to_string()));
        assert_eq!(copy.get("b"), None);
    }
}
