//! Hierarchical task namespaces
//!
//! A `Collection` maps local names to tasks and to child collections, forming
//! a tree addressed with dotted paths ("deploy.staging"). Each node carries
//! its own configuration values; resolving configuration for a path merges
//! them root-to-leaf, deeper nodes overriding shallower ones.

use crate::error::{RegistryError, RegistryResult, ResolveError, ResolveResult};
use crate::runner::Task;
use std::collections::HashMap;

/// Separator between namespace segments in a dotted path
pub const PATH_SEPARATOR: char = '.';

/// Registration options for [`Collection::add_task`]
#[derive(Debug, Clone, Default)]
pub struct TaskEntry {
    name: Option<String>,
    aliases: Vec<String>,
    default: bool,
}

impl TaskEntry {
    /// Register under the task's own declared name
    pub fn new() -> Self {
        TaskEntry::default()
    }

    /// Register under an explicit name instead of the declared one
    pub fn named(name: &str) -> Self {
        TaskEntry {
            name: Some(name.to_string()),
            ..TaskEntry::default()
        }
    }

    /// Add an alias mapping to the same task
    pub fn alias(mut self, alias: &str) -> Self {
        self.aliases.push(alias.to_string());
        self
    }

    /// Make this the collection's default entry
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}

/// A tree node of the task namespace
#[derive(Default)]
pub struct Collection {
    /// Node name; required for any non-root node
    name: Option<String>,

    /// Local name (canonical or alias) to task
    tasks: HashMap<String, Task>,

    /// Canonical task names in registration order
    task_order: Vec<String>,

    /// Canonical name to its aliases, in registration order
    aliases: HashMap<String, Vec<String>>,

    /// Child collections by local name
    collections: HashMap<String, Collection>,

    /// Child collection names in registration order
    collection_order: Vec<String>,

    /// Name of the default entry, if one is set
    default: Option<String>,

    /// This node's own configuration values
    config: HashMap<String, String>,
}

impl Collection {
    /// Create an unnamed (root) collection
    pub fn new() -> Self {
        Collection::default()
    }

    /// Create a named collection, suitable for nesting under a parent
    pub fn named(name: &str) -> Self {
        Collection {
            name: Some(name.to_string()),
            ..Collection::default()
        }
    }

    /// This node's name, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Register a task under this node
    ///
    /// The name comes from `entry` if given, else from the task's own declared
    /// name. Each alias becomes an additional key mapping to the same task.
    pub fn add_task(&mut self, task: Task, entry: TaskEntry) -> RegistryResult<()> {
        let name = match entry.name.or_else(|| task.name().map(str::to_string)) {
            Some(name) => name,
            None => return Err(RegistryError::MissingName),
        };

        // Every requested key must be free, or already belong to this same
        // canonical name (re-registration). A key claimed by a subcollection
        // or by another task's name or alias is a conflict; letting it
        // through would desynchronize the ordered listing from the key map.
        for key in std::iter::once(&name).chain(entry.aliases.iter()) {
            if self.collections.contains_key(key) {
                return Err(RegistryError::NameConflict(key.clone()));
            }
            if let Some(owner) = self.task_key_owner(key) {
                if owner != name {
                    return Err(RegistryError::NameConflict(key.clone()));
                }
            }
        }

        if entry.default {
            if let Some(existing) = &self.default {
                if existing != &name {
                    return Err(RegistryError::MultipleDefaults {
                        existing: existing.clone(),
                        proposed: name,
                    });
                }
            }
            self.default = Some(name.clone());
        }

        if !self.tasks.contains_key(&name) {
            self.task_order.push(name.clone());
        }
        // Re-registration replaces the alias set; drop keys the old set held.
        if let Some(old_aliases) = self.aliases.remove(&name) {
            for alias in old_aliases {
                self.tasks.remove(&alias);
            }
        }
        for alias in &entry.aliases {
            self.tasks.insert(alias.clone(), task.clone());
        }
        self.aliases.insert(name.clone(), entry.aliases);
        self.tasks.insert(name, task);

        Ok(())
    }

    /// Canonical name owning a task-map key, if any
    fn task_key_owner(&self, key: &str) -> Option<&str> {
        self.task_order
            .iter()
            .find(|canonical| {
                canonical.as_str() == key
                    || self.aliases_of(canonical.as_str()).iter().any(|a| a == key)
            })
            .map(String::as_str)
    }

    /// Register a child collection under its own name
    pub fn add_collection(&mut self, collection: Collection) -> RegistryResult<()> {
        let name = match collection.name() {
            Some(name) => name.to_string(),
            None => return Err(RegistryError::MissingName),
        };
        self.insert_collection(name, collection)
    }

    /// Register a child collection under an explicit name
    pub fn add_collection_as(
        &mut self,
        name: &str,
        mut collection: Collection,
    ) -> RegistryResult<()> {
        collection.name.get_or_insert_with(|| name.to_string());
        self.insert_collection(name.to_string(), collection)
    }

    fn insert_collection(&mut self, name: String, collection: Collection) -> RegistryResult<()> {
        if self.tasks.contains_key(&name) {
            return Err(RegistryError::NameConflict(name));
        }
        if !self.collections.contains_key(&name) {
            self.collection_order.push(name.clone());
        }
        self.collections.insert(name, collection);
        Ok(())
    }

    /// Resolve a dotted path to a task
    ///
    /// Segments are consumed left-to-right, matching local task and alias keys
    /// first, then child collection keys. An empty path, or a path ending on a
    /// collection name, resolves to that node's default task.
    pub fn lookup(&self, path: &str) -> ResolveResult<&Task> {
        if path.is_empty() {
            return self.default_task(path);
        }

        let mut node = self;
        let mut segments = path.split(PATH_SEPARATOR).peekable();

        while let Some(segment) = segments.next() {
            let last = segments.peek().is_none();

            if let Some(task) = node.tasks.get(segment) {
                if last {
                    return Ok(task);
                }
                // A task key cannot be descended into
                return Err(ResolveError::TaskNotFound(path.to_string()));
            }

            match node.collections.get(segment) {
                Some(child) => node = child,
                None => return Err(ResolveError::TaskNotFound(path.to_string())),
            }
        }

        node.default_task(path)
    }

    /// The default task of this node, keyed by the path used to reach it
    fn default_task(&self, path: &str) -> ResolveResult<&Task> {
        self.default
            .as_ref()
            .and_then(|name| self.tasks.get(name))
            .ok_or_else(|| ResolveError::NoDefaultTask(path.to_string()))
    }

    /// Merged configuration for a dotted path
    ///
    /// Walks the path from this node downward, layering each visited node's
    /// own configuration over the accumulated result. Segments that do not
    /// name a child collection (the task name itself, or anything else) stop
    /// the walk without error. The returned map is a fresh copy.
    pub fn configuration(&self, path: &str) -> HashMap<String, String> {
        let mut merged = self.config.clone();
        if path.is_empty() {
            return merged;
        }

        let mut node = self;
        for segment in path.split(PATH_SEPARATOR) {
            match node.collections.get(segment) {
                Some(child) => {
                    merged.extend(child.config.iter().map(|(k, v)| (k.clone(), v.clone())));
                    node = child;
                }
                None => break,
            }
        }
        merged
    }

    /// Merge values into this node's own configuration
    pub fn configure(&mut self, values: HashMap<String, String>) {
        self.config.extend(values);
    }

    /// All reachable task names, dotted, in deterministic order
    ///
    /// Own canonical names first in registration order, then each child's
    /// names prefixed with the child name, children in registration order.
    pub fn task_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.task_order.clone();
        for child_name in &self.collection_order {
            let child = &self.collections[child_name];
            for task_name in child.task_names() {
                names.push(format!("{}{}{}", child_name, PATH_SEPARATOR, task_name));
            }
        }
        names
    }

    /// This node's own tasks, canonical names only, in registration order
    pub fn tasks(&self) -> impl Iterator<Item = (&str, &Task)> {
        self.task_order
            .iter()
            .map(|name| (name.as_str(), &self.tasks[name]))
    }

    /// Aliases registered for a canonical task name
    pub fn aliases_of(&self, name: &str) -> &[String] {
        self.aliases.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Name of this node's default entry, if one is set
    pub fn default_task_name(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Child collection by local name
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Child collection names in registration order
    pub fn collection_names(&self) -> &[String] {
        &self.collection_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RegistryError, ResolveError};

    fn noop(name: &str) -> Task {
        Task::builder(|_| Ok(None)).name(name).build()
    }

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_add_task_with_explicit_name() {
        let mut c = Collection::new();
        let t = noop("anything");
        c.add_task(t.clone(), TaskEntry::named("foo")).unwrap();

        assert_eq!(c.lookup("foo").unwrap(), &t);
        assert_eq!(c.task_names(), vec!["foo".to_string()]);
    }

    #[test]
    fn test_add_task_uses_declared_name() {
        let mut c = Collection::new();
        c.add_task(noop("mytask"), TaskEntry::new()).unwrap();
        assert!(c.lookup("mytask").is_ok());
    }

    #[test]
    fn test_add_task_without_any_name_fails() {
        let mut c = Collection::new();
        let anonymous = Task::builder(|_| Ok(None)).build();
        let result = c.add_task(anonymous, TaskEntry::new());
        assert!(matches!(result, Err(RegistryError::MissingName)));
    }

    #[test]
    fn test_aliases_resolve_to_same_task() {
        let mut c = Collection::new();
        let t = noop("foo");
        c.add_task(t.clone(), TaskEntry::named("foo").alias("bar").alias("biz"))
            .unwrap();

        assert_eq!(c.lookup("bar").unwrap(), &t);
        assert_eq!(c.lookup("biz").unwrap(), &t);
        assert_eq!(c.aliases_of("foo"), &["bar".to_string(), "biz".to_string()]);
        // Aliases are not part of the canonical name list
        assert_eq!(c.task_names(), vec!["foo".to_string()]);
    }

    #[test]
    fn test_task_name_conflicts_with_subcollection() {
        let mut c = Collection::new();
        c.add_collection(Collection::named("sub")).unwrap();
        let result = c.add_task(noop("whatever"), TaskEntry::named("sub"));
        assert!(matches!(result, Err(RegistryError::NameConflict(name)) if name == "sub"));
    }

    #[test]
    fn test_subcollection_conflicts_with_task() {
        let mut c = Collection::new();
        c.add_task(noop("sub"), TaskEntry::new()).unwrap();
        let result = c.add_collection(Collection::named("sub"));
        assert!(matches!(result, Err(RegistryError::NameConflict(name)) if name == "sub"));
    }

    #[test]
    fn test_alias_conflicts_with_subcollection() {
        let mut c = Collection::new();
        c.add_collection(Collection::named("sub")).unwrap();
        let result = c.add_task(noop("foo"), TaskEntry::new().alias("sub"));
        assert!(matches!(result, Err(RegistryError::NameConflict(name)) if name == "sub"));
    }

    #[test]
    fn test_alias_conflicts_with_existing_task_name() {
        let mut c = Collection::new();
        c.add_task(noop("build"), TaskEntry::new()).unwrap();
        let result = c.add_task(noop("deploy"), TaskEntry::new().alias("build"));
        assert!(matches!(result, Err(RegistryError::NameConflict(name)) if name == "build"));
    }

    #[test]
    fn test_task_name_conflicts_with_existing_alias() {
        let mut c = Collection::new();
        c.add_task(noop("build"), TaskEntry::new().alias("b")).unwrap();
        let result = c.add_task(noop("b"), TaskEntry::new());
        assert!(matches!(result, Err(RegistryError::NameConflict(name)) if name == "b"));
    }

    #[test]
    fn test_alias_conflicts_with_existing_alias() {
        let mut c = Collection::new();
        c.add_task(noop("build"), TaskEntry::new().alias("b")).unwrap();
        let result = c.add_task(noop("bench"), TaskEntry::new().alias("b"));
        assert!(matches!(result, Err(RegistryError::NameConflict(name)) if name == "b"));
    }

    #[test]
    fn test_reregistration_replaces_task_and_aliases() {
        let mut c = Collection::new();
        c.add_task(noop("build"), TaskEntry::new().alias("old")).unwrap();

        let replacement = noop("build");
        c.add_task(replacement.clone(), TaskEntry::new().alias("new"))
            .unwrap();

        assert_eq!(c.lookup("build").unwrap(), &replacement);
        assert_eq!(c.lookup("new").unwrap(), &replacement);
        // The old alias key is gone, and the listing stays single-entry.
        assert!(c.lookup("old").is_err());
        assert_eq!(c.task_names(), vec!["build".to_string()]);
    }

    #[test]
    fn test_nameless_subcollection_fails() {
        let mut root = Collection::new();
        let result = root.add_collection(Collection::new());
        assert!(matches!(result, Err(RegistryError::MissingName)));
    }

    #[test]
    fn test_add_collection_as_names_the_child() {
        let mut root = Collection::new();
        root.add_collection_as("notsub", Collection::new()).unwrap();
        assert_eq!(
            root.collection("notsub").unwrap().name(),
            Some("notsub")
        );
    }

    #[test]
    fn test_default_task_on_empty_lookup() {
        let mut c = Collection::new();
        let t = noop("foo");
        c.add_task(t.clone(), TaskEntry::new().as_default()).unwrap();
        assert_eq!(c.lookup("").unwrap(), &t);
        assert_eq!(c.default_task_name(), Some("foo"));
    }

    #[test]
    fn test_multiple_defaults_fail() {
        let mut c = Collection::new();
        c.add_task(noop("foo"), TaskEntry::new().as_default()).unwrap();
        let result = c.add_task(noop("bar"), TaskEntry::new().as_default());
        assert!(matches!(result, Err(RegistryError::MultipleDefaults { .. })));
    }

    #[test]
    fn test_redefaulting_same_name_is_allowed() {
        let mut c = Collection::new();
        c.add_task(noop("foo"), TaskEntry::new().as_default()).unwrap();
        let replacement = noop("foo");
        c.add_task(replacement.clone(), TaskEntry::new().as_default())
            .unwrap();
        assert_eq!(c.lookup("").unwrap(), &replacement);
    }

    #[test]
    fn test_no_default_task_errors() {
        let c = Collection::new();
        let result = c.lookup("");
        assert!(matches!(result, Err(ResolveError::NoDefaultTask(_))));
    }

    #[test]
    fn test_dotted_lookup_matches_direct_lookup() {
        let mut sub = Collection::named("sub");
        let leaf = noop("leaf");
        sub.add_task(leaf.clone(), TaskEntry::new()).unwrap();

        let mut root = Collection::new();
        root.add_collection(sub).unwrap();

        let via_root = root.lookup("sub.leaf").unwrap();
        let via_sub = root.collection("sub").unwrap().lookup("leaf").unwrap();
        assert_eq!(via_root, via_sub);
        assert_eq!(via_root, &leaf);
    }

    #[test]
    fn test_subcollection_alias_lookup() {
        let mut sub = Collection::named("sub");
        let t = noop("foo");
        sub.add_task(t.clone(), TaskEntry::new().alias("bar")).unwrap();

        let mut root = Collection::new();
        root.add_collection(sub).unwrap();
        assert_eq!(root.lookup("sub.bar").unwrap(), &t);
    }

    #[test]
    fn test_path_ending_on_subcollection_uses_its_default() {
        let mut sub = Collection::named("sub");
        let t = noop("biz");
        sub.add_task(t.clone(), TaskEntry::new().as_default()).unwrap();

        let mut root = Collection::new();
        root.add_collection(sub).unwrap();

        assert_eq!(root.lookup("sub").unwrap(), &t);
        assert_eq!(root.lookup("sub").unwrap(), root.lookup("sub.biz").unwrap());
    }

    #[test]
    fn test_path_ending_on_defaultless_subcollection_errors() {
        let mut root = Collection::new();
        root.add_collection(Collection::named("whatever")).unwrap();
        let result = root.lookup("whatever");
        assert!(matches!(result, Err(ResolveError::NoDefaultTask(path)) if path == "whatever"));
    }

    #[test]
    fn test_unknown_segment_errors() {
        let mut root = Collection::new();
        root.add_task(noop("foo"), TaskEntry::new()).unwrap();

        assert!(matches!(
            root.lookup("nope"),
            Err(ResolveError::TaskNotFound(path)) if path == "nope"
        ));
        // A task key cannot be used as a namespace
        assert!(matches!(
            root.lookup("foo.deeper"),
            Err(ResolveError::TaskNotFound(_))
        ));
    }

    #[test]
    fn test_configuration_merges_root_to_leaf() {
        let mut sub = Collection::named("sub");
        sub.configure(map(&[("a", "2"), ("b", "3")]));

        let mut root = Collection::new();
        root.configure(map(&[("a", "1")]));
        root.add_collection(sub).unwrap();

        assert_eq!(root.configuration("sub.anything"), map(&[("a", "2"), ("b", "3")]));
        assert_eq!(root.configuration(""), map(&[("a", "1")]));
    }

    #[test]
    fn test_configuration_returns_fresh_copy() {
        let mut root = Collection::new();
        root.configure(map(&[("a", "1")]));

        let mut copy = root.configuration("");
        copy.insert("a".to_string(), "mutated".to_string());

        assert_eq!(root.configuration(""), map(&[("a", "1")]));
    }

    #[test]
    fn test_task_names_are_ordered_and_prefixed() {
        let mut sub = Collection::named("sub");
        sub.add_task(noop("sub_task"), TaskEntry::new()).unwrap();

        let mut root = Collection::new();
        root.add_task(noop("top_level"), TaskEntry::new()).unwrap();
        root.add_collection(sub).unwrap();

        assert_eq!(
            root.task_names(),
            vec!["top_level".to_string(), "sub.sub_task".to_string()]
        );
        // Stable across calls
        assert_eq!(root.task_names(), root.task_names());
    }
}
