//! Task graph expansion and execution
//!
//! The executor turns a batch of requested task specs into a deduplicated,
//! dependency-expanded, ordered run: resolve every name up front (fail-fast),
//! bind calls, expand pre-tasks depth-first, drop duplicate calls, then run
//! strictly sequentially with a per-task configuration scope.

use crate::error::{ExecutionError, Result};
use crate::runner::{Call, Collection, Context, Task, TaskReturn};
use std::collections::HashMap;

/// One requested task: a dotted name, optionally with keyword arguments
#[derive(Debug, Clone)]
pub enum TaskSpec {
    /// Bare dotted name, implying no arguments
    Name(String),

    /// Dotted name with bound keyword arguments
    Call {
        name: String,
        kwargs: HashMap<String, String>,
    },
}

impl TaskSpec {
    /// Spec for a bare name
    pub fn name(name: impl Into<String>) -> Self {
        TaskSpec::Name(name.into())
    }

    /// Spec for a name with keyword arguments
    pub fn call(name: impl Into<String>, kwargs: HashMap<String, String>) -> Self {
        TaskSpec::Call {
            name: name.into(),
            kwargs,
        }
    }

    fn parts(&self) -> (&str, Option<&HashMap<String, String>>) {
        match self {
            TaskSpec::Name(name) => (name, None),
            TaskSpec::Call { name, kwargs } => (name, Some(kwargs)),
        }
    }
}

impl From<&str> for TaskSpec {
    fn from(name: &str) -> Self {
        TaskSpec::Name(name.to_string())
    }
}

impl From<String> for TaskSpec {
    fn from(name: String) -> Self {
        TaskSpec::Name(name)
    }
}

impl From<(&str, HashMap<String, String>)> for TaskSpec {
    fn from((name, kwargs): (&str, HashMap<String, String>)) -> Self {
        TaskSpec::call(name, kwargs)
    }
}

/// Return values of a successful run, keyed by task identity
///
/// One slot per task: with deduplication off, a task invoked twice with
/// different arguments keeps only the value of its last invocation.
pub type RunResults = HashMap<Task, TaskReturn>;

/// A call together with the dotted path it was requested through
///
/// The path scopes configuration: pre-tasks inherit the path of the top-level
/// spec that pulled them in.
#[derive(Debug, Clone)]
struct Bound {
    call: Call,
    path: String,
}

enum WorkItem {
    Visit(Bound),
    Emit(Bound),
}

/// Sequential execution engine over a task collection
pub struct Executor {
    collection: Collection,
    context: Context,
}

impl Executor {
    /// Create an executor with an empty base context
    pub fn new(collection: Collection) -> Self {
        Executor {
            collection,
            context: Context::new(),
        }
    }

    /// Set the base context cloned into contextualized tasks
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// The collection tasks are resolved against
    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Execute the given specs with deduplication enabled
    pub fn execute<I, S>(&self, specs: I) -> Result<RunResults>
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskSpec>,
    {
        self.execute_with(specs, true)
    }

    /// Execute the given specs, optionally skipping deduplication
    pub fn execute_with<I, S>(&self, specs: I, dedupe: bool) -> Result<RunResults>
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskSpec>,
    {
        let specs: Vec<TaskSpec> = specs.into_iter().map(Into::into).collect();

        // Resolve every spec before any task runs, so a bad name never leaves
        // partial side effects behind.
        let mut bound = Vec::with_capacity(specs.len());
        for spec in &specs {
            let (name, kwargs) = spec.parts();
            let task = self.collection.lookup(name)?.clone();
            let call = match kwargs {
                Some(kwargs) => Call::with_kwargs(task, kwargs.clone()),
                None => Call::new(task),
            };
            bound.push(Bound {
                call,
                path: name.to_string(),
            });
        }

        let expanded = expand(bound);

        let run_list = if dedupe {
            let mut deduped: Vec<Bound> = Vec::with_capacity(expanded.len());
            for entry in expanded {
                if !deduped.iter().any(|seen| seen.call == entry.call) {
                    deduped.push(entry);
                }
            }
            deduped
        } else {
            expanded
        };

        let mut results = RunResults::new();
        for entry in &run_list {
            let value = self.run_one(entry)?;
            results.insert(entry.call.task.clone(), value);
        }
        Ok(results)
    }

    fn run_one(&self, entry: &Bound) -> Result<TaskReturn> {
        let task = &entry.call.task;

        let context = if task.contextualized() {
            let mut context = self.context.clone();
            context.update(self.collection.configuration(&entry.path));
            Some(context)
        } else {
            None
        };

        task.invoke(context, &entry.call.args, &entry.call.kwargs)
            .map_err(|source| {
                ExecutionError::TaskFailed {
                    name: task
                        .name()
                        .map(str::to_string)
                        .unwrap_or_else(|| entry.path.clone()),
                    source,
                }
                .into()
            })
    }
}

/// Depth-first, pre-order expansion of pre-tasks
///
/// Pre-tasks of pre-tasks are fully expanded and emitted before the task that
/// declares them. Implemented with an explicit worklist; tasks are immutable
/// after construction, so the pre-task graph cannot contain cycles.
fn expand(top: Vec<Bound>) -> Vec<Bound> {
    let mut out = Vec::new();
    let mut stack: Vec<WorkItem> = top.into_iter().rev().map(WorkItem::Visit).collect();

    while let Some(item) = stack.pop() {
        match item {
            WorkItem::Visit(entry) => {
                let pres: Vec<WorkItem> = entry
                    .call
                    .task
                    .pre()
                    .iter()
                    .rev()
                    .map(|pre| {
                        WorkItem::Visit(Bound {
                            call: Call::new(pre.clone()),
                            path: entry.path.clone(),
                        })
                    })
                    .collect();
                stack.push(WorkItem::Emit(entry));
                stack.extend(pres);
            }
            WorkItem::Emit(entry) => out.push(entry),
        }
    }
    out
}
