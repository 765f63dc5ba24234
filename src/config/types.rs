//! Configuration file types
//!
//! These structures represent a tasknest.yml file: a root namespace with
//! configuration values, task definitions, and arbitrarily nested child
//! namespaces.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    /// Application name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Root namespace configuration values
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub configuration: HashMap<String, String>,

    /// Tasks defined at the root
    #[serde(default)]
    pub tasks: HashMap<String, TaskDef>,

    /// Nested namespaces
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub namespaces: HashMap<String, NamespaceDef>,
}

/// A nested namespace definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NamespaceDef {
    /// Configuration values local to this namespace
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub configuration: HashMap<String, String>,

    /// Tasks defined in this namespace
    #[serde(default)]
    pub tasks: HashMap<String, TaskDef>,

    /// Further nested namespaces
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub namespaces: HashMap<String, NamespaceDef>,
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TaskDef {
    /// Usage description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Shell command to run
    pub run: String,

    /// Names of tasks in the same namespace that must run first
    #[serde(default, deserialize_with = "deserialize_string_or_seq")]
    pub pre: Vec<String>,

    /// Additional names resolving to this task
    #[serde(default, deserialize_with = "deserialize_string_or_seq")]
    pub aliases: Vec<String>,

    /// Whether this task is the namespace's default
    #[serde(default)]
    pub default: bool,

    /// Declared parameters, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDef>,

    /// Positional-argument-order override (parameter names)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub positional: Option<Vec<String>>,

    /// Suppress the command echo
    #[serde(default)]
    pub quiet: bool,
}

/// A parameter definition
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ParamDef {
    /// Parameter name
    pub name: String,

    /// Default value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,

    /// Usage description for help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

/// Custom deserializer accepting either a single string or a list of strings
fn deserialize_string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(vec![s]),
        Value::Sequence(seq) => {
            let mut out = Vec::new();
            for item in seq {
                match item {
                    Value::String(s) => out.push(s),
                    _ => return Err(D::Error::custom("expected a string")),
                }
            }
            Ok(out)
        }
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("expected a string or list of strings")),
    }
}
