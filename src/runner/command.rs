//! Shell command execution
//!
//! Process plumbing for tasks defined in configuration files. The engine core
//! never touches this; it only ever sees the task body closure built around
//! `run_shell`.

use crate::runner::interpolate;
use anyhow::Context as _;
use std::collections::HashMap;
use std::process::{Command as StdCommand, Stdio};

/// Interpolate and run a shell command, inheriting stdio
///
/// Returns `Ok(None)` on success; output capture is deliberately not offered.
pub fn run_shell(
    command: &str,
    vars: &HashMap<String, String>,
    quiet: bool,
) -> anyhow::Result<Option<String>> {
    let exec = interpolate(command, vars)?;

    if !quiet {
        eprintln!("[RUN] {}", exec);
    }

    let status = StdCommand::new("sh")
        .arg("-c")
        .arg(&exec)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .envs(vars)
        .status()
        .with_context(|| format!("failed to spawn '{}'", exec))?;

    if !status.success() {
        anyhow::bail!("command exited with status {:?}", status.code());
    }
    Ok(None)
}
