//! Variable interpolation for command strings
//!
//! Replaces `${var}` occurrences with values from the supplied map, falling
//! back to the process environment.

use crate::error::{InterpolationError, InterpolationResult};
use regex::Regex;
use std::collections::HashMap;
use std::env;

/// Interpolate `${var}` patterns in a string
pub fn interpolate(s: &str, vars: &HashMap<String, String>) -> InterpolationResult<String> {
    let re = Regex::new(r"\$\{([^}]*)\}").unwrap();

    let mut missing: Option<String> = None;
    let result = re
        .replace_all(s, |caps: &regex::Captures| {
            let name = &caps[1];
            if let Some(value) = vars.get(name) {
                value.clone()
            } else if let Ok(value) = env::var(name) {
                value
            } else {
                if missing.is_none() {
                    missing = Some(name.to_string());
                }
                String::new()
            }
        })
        .into_owned();

    if let Some(name) = missing {
        if name.is_empty() {
            return Err(InterpolationError::InvalidSyntax(
                "empty variable reference '${}'".to_string(),
            ));
        }
        return Err(InterpolationError::UndefinedVariable(name));
    }
    Ok(result)
}
