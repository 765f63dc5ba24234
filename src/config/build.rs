//! Building a task collection from parsed configuration
//!
//! This is the bridge between the declarative tasknest.yml format and the
//! runtime namespace tree: every task definition becomes a contextualized
//! shell task, pre-task references are resolved within their namespace, and
//! nested namespace definitions become child collections.

use crate::config::types::{ConfigFile, NamespaceDef, TaskDef};
use crate::error::{ConfigError, ConfigResult, Result};
use crate::runner::{run_shell, Collection, Invocation, Task, TaskEntry, Verbosity};
use std::collections::HashMap;

/// Build the full namespace tree from a parsed configuration file
pub fn build_collection(config: &ConfigFile) -> Result<Collection> {
    build_node(
        None,
        &config.configuration,
        &config.tasks,
        &config.namespaces,
    )
}

fn build_node(
    name: Option<&str>,
    configuration: &HashMap<String, String>,
    tasks: &HashMap<String, TaskDef>,
    namespaces: &HashMap<String, NamespaceDef>,
) -> Result<Collection> {
    let mut collection = match name {
        Some(name) => Collection::named(name),
        None => Collection::new(),
    };
    collection.configure(configuration.clone());

    // Names are registered in sorted order so task listings are deterministic
    // regardless of YAML map iteration order.
    let mut task_names: Vec<&String> = tasks.keys().collect();
    task_names.sort();

    let mut built: HashMap<String, Task> = HashMap::new();
    for &task_name in &task_names {
        build_task(task_name, tasks, &mut built, &mut Vec::new())?;
    }

    for &task_name in &task_names {
        let def = &tasks[task_name];
        let mut entry = TaskEntry::named(task_name);
        for alias in &def.aliases {
            entry = entry.alias(alias);
        }
        if def.default {
            entry = entry.as_default();
        }
        collection.add_task(built[task_name].clone(), entry)?;
    }

    let mut namespace_names: Vec<&String> = namespaces.keys().collect();
    namespace_names.sort();

    for ns_name in namespace_names {
        let ns = &namespaces[ns_name];
        let child = build_node(Some(ns_name.as_str()), &ns.configuration, &ns.tasks, &ns.namespaces)?;
        collection.add_collection(child)?;
    }

    Ok(collection)
}

/// Build one task, recursively building its pre-tasks first
///
/// `stack` holds the names currently being built, to detect cycles.
fn build_task(
    name: &str,
    defs: &HashMap<String, TaskDef>,
    built: &mut HashMap<String, Task>,
    stack: &mut Vec<String>,
) -> ConfigResult<Task> {
    if let Some(task) = built.get(name) {
        return Ok(task.clone());
    }

    if stack.iter().any(|n| n == name) {
        stack.push(name.to_string());
        return Err(ConfigError::CircularDependency(stack.join(" -> ")));
    }
    stack.push(name.to_string());

    let def = defs
        .get(name)
        .ok_or_else(|| ConfigError::Invalid(format!("task '{}' is not defined", name)))?;

    let mut pre = Vec::with_capacity(def.pre.len());
    for pre_name in &def.pre {
        if !defs.contains_key(pre_name) {
            return Err(ConfigError::UnknownPreTask {
                task: name.to_string(),
                pre: pre_name.clone(),
            });
        }
        pre.push(build_task(pre_name, defs, built, stack)?);
    }

    stack.pop();

    let task = shell_task(name, def, pre);
    built.insert(name.to_string(), task.clone());
    Ok(task)
}

/// Wrap a task definition's shell command into a task body
///
/// Interpolation variables, weakest first: parameter defaults, merged context
/// configuration, then explicit keyword arguments. The command echo follows
/// the context verbosity: quiet suppresses it, verbose forces it even for
/// tasks marked `quiet:` in the configuration.
fn shell_task(name: &str, def: &TaskDef, pre: Vec<Task>) -> Task {
    let command = def.run.clone();
    let quiet = def.quiet;
    let defaults: Vec<(String, String)> = def
        .params
        .iter()
        .filter_map(|p| p.default.as_ref().map(|d| (p.name.clone(), d.clone())))
        .collect();

    let mut builder = Task::builder(move |inv: Invocation<'_>| {
        let mut vars: HashMap<String, String> = defaults.iter().cloned().collect();
        let mut verbosity = Verbosity::default();
        if let Some(context) = &inv.context {
            vars.extend(context.config().clone());
            verbosity = context.verbosity();
        }
        vars.extend(inv.kwargs.clone());
        let echo = verbosity >= Verbosity::Verbose || (!quiet && verbosity >= Verbosity::Normal);
        run_shell(&command, &vars, !echo)
    })
    .name(name)
    .contextualized(true)
    .pre_tasks(pre);

    if let Some(usage) = &def.usage {
        builder = builder.usage(usage);
    }
    for param in &def.params {
        builder = builder.param(&param.name, param.default.as_deref());
    }
    if let Some(positional) = &def.positional {
        builder = builder.positional(positional.clone());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::error::TasknestError;

    #[test]
    fn test_build_registers_tasks_and_namespaces() {
        let config = parse_config(
            r#"
configuration:
  env: dev
tasks:
  build:
    usage: Build the project
    run: "true"
    aliases: [b]
    default: true
namespaces:
  docs:
    configuration:
      env: docs
    tasks:
      publish:
        run: "true"
"#,
        )
        .unwrap();

        let collection = build_collection(&config).unwrap();

        assert_eq!(
            collection.task_names(),
            vec!["build".to_string(), "docs.publish".to_string()]
        );
        assert!(collection.lookup("b").is_ok());
        assert_eq!(collection.lookup("").unwrap(), collection.lookup("build").unwrap());
        assert_eq!(
            collection.configuration("docs.publish")["env"],
            "docs".to_string()
        );

        let build = collection.lookup("build").unwrap();
        assert!(build.contextualized());
        assert_eq!(build.usage(), Some("Build the project"));
    }

    #[test]
    fn test_build_resolves_pre_tasks() {
        let config = parse_config(
            r#"
tasks:
  clean:
    run: "true"
  build:
    run: "true"
    pre: clean
"#,
        )
        .unwrap();

        let collection = build_collection(&config).unwrap();
        let build = collection.lookup("build").unwrap();
        let clean = collection.lookup("clean").unwrap();

        assert_eq!(build.pre(), &[clean.clone()]);
    }

    #[test]
    fn test_unknown_pre_task_errors() {
        let config = parse_config(
            r#"
tasks:
  build:
    run: "true"
    pre: missing
"#,
        )
        .unwrap();

        let result = build_collection(&config);
        assert!(matches!(
            result,
            Err(TasknestError::Config(ConfigError::UnknownPreTask { task, pre }))
                if task == "build" && pre == "missing"
        ));
    }

    #[test]
    fn test_circular_pre_tasks_error() {
        let config = parse_config(
            r#"
tasks:
  a:
    run: "true"
    pre: b
  b:
    run: "true"
    pre: a
"#,
        )
        .unwrap();

        let result = build_collection(&config);
        assert!(matches!(
            result,
            Err(TasknestError::Config(ConfigError::CircularDependency(_)))
        ));
    }

    #[test]
    fn test_shared_pre_task_is_same_task_object() {
        let config = parse_config(
            r#"
tasks:
  base:
    run: "true"
  one:
    run: "true"
    pre: base
  two:
    run: "true"
    pre: base
"#,
        )
        .unwrap();

        let collection = build_collection(&config).unwrap();
        let one = collection.lookup("one").unwrap();
        let two = collection.lookup("two").unwrap();

        // Both pre lists reference the identical task, so the executor can
        // deduplicate it across requests.
        assert_eq!(one.pre()[0], two.pre()[0]);
    }

    #[test]
    fn test_task_params_carried_onto_task() {
        let config = parse_config(
            r#"
tasks:
  greet:
    run: echo "${greeting}, ${name}"
    params:
      - name: greeting
        default: Hello
      - name: name
    positional: [name]
"#,
        )
        .unwrap();

        let collection = build_collection(&config).unwrap();
        let greet = collection.lookup("greet").unwrap();

        assert_eq!(greet.params()[0].name, "greeting");
        assert_eq!(greet.params()[0].default, Some("Hello".to_string()));
        assert_eq!(greet.params()[1].default, None);
        assert_eq!(greet.positional(), Some(&["name".to_string()][..]));
    }
}
