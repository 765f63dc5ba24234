//! Task and call value objects
//!
//! A `Task` is an immutable unit of work: a body plus the metadata needed to
//! register it in a collection and surface it on a command line. A `Call`
//! binds a task to the arguments of one requested invocation and exists only
//! to give the executor something to deduplicate on.

use crate::runner::Context;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Return value of a task body
pub type TaskReturn = Option<String>;

/// The callable behind a task
pub type Body = dyn Fn(Invocation<'_>) -> anyhow::Result<TaskReturn> + Send + Sync;

/// Argument bundle handed to a task body for one invocation
pub struct Invocation<'a> {
    /// Merged configuration scope; present iff the task is contextualized
    pub context: Option<Context>,

    /// Bound positional arguments
    pub args: &'a [String],

    /// Bound keyword arguments
    pub kwargs: &'a HashMap<String, String>,
}

/// A declared task parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name
    pub name: String,

    /// Default value, if the parameter is optional
    pub default: Option<String>,
}

struct TaskInner {
    /// Declared name, used when no explicit name is given at registration
    name: Option<String>,

    /// One-line description for help surfaces
    usage: Option<String>,

    /// Whether the body receives a merged configuration scope
    contextualized: bool,

    /// Tasks that must run before this one, in declaration order
    pre: Vec<Task>,

    /// Positional-argument-order override (parameter names)
    positional: Option<Vec<String>>,

    /// Declared parameters, in declaration order
    params: Vec<Param>,

    body: Box<Body>,
}

/// An immutable, registry-independent unit of work
///
/// Tasks are cheap to clone; clones share the same underlying definition.
/// Equality and hashing are by identity of that definition, which is what the
/// executor keys its result map on.
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

impl Task {
    /// Start building a task around a body
    pub fn builder<F>(body: F) -> TaskBuilder
    where
        F: Fn(Invocation<'_>) -> anyhow::Result<TaskReturn> + Send + Sync + 'static,
    {
        TaskBuilder {
            name: None,
            usage: None,
            contextualized: false,
            pre: Vec::new(),
            positional: None,
            params: Vec::new(),
            body: Box::new(body),
        }
    }

    /// Declared task name, if any
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// One-line description, if any
    pub fn usage(&self) -> Option<&str> {
        self.inner.usage.as_deref()
    }

    /// Whether the body expects a configuration scope as leading input
    pub fn contextualized(&self) -> bool {
        self.inner.contextualized
    }

    /// Declared pre-tasks, in declaration order
    pub fn pre(&self) -> &[Task] {
        &self.inner.pre
    }

    /// Positional-argument-order override, if declared
    pub fn positional(&self) -> Option<&[String]> {
        self.inner.positional.as_deref()
    }

    /// Declared parameters, in declaration order
    pub fn params(&self) -> &[Param] {
        &self.inner.params
    }

    /// Run the task body with the given invocation inputs
    pub fn invoke(
        &self,
        context: Option<Context>,
        args: &[String],
        kwargs: &HashMap<String, String>,
    ) -> anyhow::Result<TaskReturn> {
        (self.inner.body)(Invocation {
            context,
            args,
            kwargs,
        })
    }
}

impl PartialEq for Task {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Task {}

impl Hash for Task {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.inner) as usize).hash(state);
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.inner.name)
            .field("contextualized", &self.inner.contextualized)
            .field("pre", &self.inner.pre.len())
            .finish()
    }
}

/// Builder for `Task`
///
/// All metadata is captured here; nothing is validated until the task is
/// registered in a collection.
pub struct TaskBuilder {
    name: Option<String>,
    usage: Option<String>,
    contextualized: bool,
    pre: Vec<Task>,
    positional: Option<Vec<String>>,
    params: Vec<Param>,
    body: Box<Body>,
}

impl TaskBuilder {
    /// Set the declared name
    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Set the one-line description
    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    /// Mark the task as requiring a configuration scope
    pub fn contextualized(mut self, contextualized: bool) -> Self {
        self.contextualized = contextualized;
        self
    }

    /// Append a pre-task
    pub fn pre(mut self, task: Task) -> Self {
        self.pre.push(task);
        self
    }

    /// Replace the full pre-task list
    pub fn pre_tasks(mut self, tasks: Vec<Task>) -> Self {
        self.pre = tasks;
        self
    }

    /// Override positional argument order
    pub fn positional(mut self, order: Vec<String>) -> Self {
        self.positional = Some(order);
        self
    }

    /// Declare a parameter
    pub fn param(mut self, name: &str, default: Option<&str>) -> Self {
        self.params.push(Param {
            name: name.to_string(),
            default: default.map(str::to_string),
        });
        self
    }

    /// Finish building
    pub fn build(self) -> Task {
        Task {
            inner: Arc::new(TaskInner {
                name: self.name,
                usage: self.usage,
                contextualized: self.contextualized,
                pre: self.pre,
                positional: self.positional,
                params: self.params,
                body: self.body,
            }),
        }
    }
}

/// A task bound to the arguments of one requested invocation
///
/// Two calls are equal iff they reference the same task and carry equal
/// arguments; the executor relies on this, and nothing else, to deduplicate
/// an expanded run.
#[derive(Debug, Clone)]
pub struct Call {
    /// The task to invoke
    pub task: Task,

    /// Bound positional arguments
    pub args: Vec<String>,

    /// Bound keyword arguments
    pub kwargs: HashMap<String, String>,
}

impl Call {
    /// Bind a task with no explicit arguments
    pub fn new(task: Task) -> Self {
        Call {
            task,
            args: Vec::new(),
            kwargs: HashMap::new(),
        }
    }

    /// Bind a task with keyword arguments
    pub fn with_kwargs(task: Task, kwargs: HashMap<String, String>) -> Self {
        Call {
            task,
            args: Vec::new(),
            kwargs,
        }
    }
}

impl PartialEq for Call {
    fn eq(&self, other: &Self) -> bool {
        self.task == other.task && self.args == other.args && self.kwargs == other.kwargs
    }
}

impl Eq for Call {}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Task {
        Task::builder(|_| Ok(None)).build()
    }

    #[test]
    fn test_builder_captures_metadata() {
        let pre = noop();
        let task = Task::builder(|_| Ok(Some("done".to_string())))
            .name("build")
            .contextualized(true)
            .pre(pre.clone())
            .param("target", Some("debug"))
            .param("jobs", None)
            .positional(vec!["jobs".to_string(), "target".to_string()])
            .build();

        assert_eq!(task.name(), Some("build"));
        assert!(task.contextualized());
        assert_eq!(task.pre(), &[pre]);
        assert_eq!(task.params().len(), 2);
        assert_eq!(task.params()[0].name, "target");
        assert_eq!(task.params()[0].default, Some("debug".to_string()));
        assert_eq!(
            task.positional(),
            Some(&["jobs".to_string(), "target".to_string()][..])
        );
    }

    #[test]
    fn test_task_equality_is_identity() {
        let a = noop();
        let b = noop();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_invoke_passes_kwargs() {
        let task = Task::builder(|inv: Invocation<'_>| {
            Ok(inv.kwargs.get("name").cloned())
        })
        .build();

        let mut kwargs = HashMap::new();
        kwargs.insert("name".to_string(), "world".to_string());

        let result = task.invoke(None, &[], &kwargs).unwrap();
        assert_eq!(result, Some("world".to_string()));
    }

    #[test]
    fn test_call_equality() {
        let task = noop();
        let other = noop();

        let mut kwargs = HashMap::new();
        kwargs.insert("k".to_string(), "v".to_string());

        assert_eq!(Call::new(task.clone()), Call::new(task.clone()));
        assert_ne!(Call::new(task.clone()), Call::new(other));
        assert_ne!(
            Call::new(task.clone()),
            Call::with_kwargs(task, kwargs)
        );
    }
}
