//! Main CLI application
//!
//! Builds a clap command tree from collection metadata: one subcommand per
//! reachable dotted task name, with flags and positionals derived from each
//! task's declared parameters.

use crate::config::{build_collection, parse_config_auto, parse_config_file};
use crate::error::{Result, TasknestError};
use crate::runner::{Collection, Context, Executor, Task, TaskSpec, Verbosity};
use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::Colorize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Help-surface metadata for one reachable task
struct TaskInfo {
    /// Dotted path from the root
    path: String,

    /// Dotted alias paths
    aliases: Vec<String>,

    /// Whether this task is its collection's default entry
    default: bool,

    task: Task,
}

/// CLI application
pub struct App {
    /// The clap command
    command: Command,

    /// Execution engine over the loaded namespace
    executor: Executor,
}

impl App {
    /// Create a new app, discovering the configuration file automatically
    pub fn new() -> Result<Self> {
        let (config, _path) = parse_config_auto()?;
        let collection = build_collection(&config)?;
        Ok(Self::from_collection(collection, config.name.as_deref()))
    }

    /// Create app with a specific config file
    pub fn with_config_file(path: PathBuf) -> Result<Self> {
        let config = parse_config_file(&path)?;
        let collection = build_collection(&config)?;
        Ok(Self::from_collection(collection, config.name.as_deref()))
    }

    /// Create app around an already-built collection
    pub fn from_collection(collection: Collection, name: Option<&str>) -> Self {
        let command = build_command(&collection, name.unwrap_or("tasknest"));
        App {
            command,
            executor: Executor::new(collection),
        }
    }

    /// Run the application with command line arguments
    pub fn run(mut self) -> Result<()> {
        let matches = self.command.clone().get_matches();

        if matches.get_flag("list") {
            print_listing(self.executor.collection());
            return Ok(());
        }

        let dedupe = !matches.get_flag("no-dedupe");
        let context = Context::new().with_verbosity(get_verbosity(&matches));

        let (task_name, task_matches) = match matches.subcommand() {
            Some((name, sub_matches)) => (name.to_string(), sub_matches),
            None => {
                // No task specified; fall back to the collection default if
                // one exists, else show help.
                if self.executor.collection().lookup("").is_ok() {
                    self.executor
                        .with_context(context)
                        .execute_with([TaskSpec::name("")], dedupe)?;
                    return Ok(());
                }
                self.command.print_help().map_err(TasknestError::Io)?;
                println!();
                return Ok(());
            }
        };

        let task = self.executor.collection().lookup(&task_name)?.clone();
        let kwargs = parse_task_kwargs(&task, task_matches);

        self.executor
            .with_context(context)
            .execute_with([TaskSpec::call(task_name, kwargs)], dedupe)?;
        Ok(())
    }
}

/// Walk the namespace tree collecting help-surface metadata
fn collect_task_info(collection: &Collection, prefix: &str, out: &mut Vec<TaskInfo>) {
    for (name, task) in collection.tasks() {
        let path = format!("{}{}", prefix, name);
        let aliases = collection
            .aliases_of(name)
            .iter()
            .map(|alias| format!("{}{}", prefix, alias))
            .collect();
        out.push(TaskInfo {
            path,
            aliases,
            default: collection.default_task_name() == Some(name),
            task: task.clone(),
        });
    }
    for child_name in collection.collection_names() {
        let child = collection.collection(child_name).expect("ordered name");
        let child_prefix = format!("{}{}.", prefix, child_name);
        collect_task_info(child, &child_prefix, out);
    }
}

/// Build the clap command from collection metadata
fn build_command(collection: &Collection, app_name: &str) -> Command {
    let mut cmd = Command::new(app_name.to_string())
        .version(env!("CARGO_PKG_VERSION"))
        .about("A namespace-aware task runner")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Path to tasknest.yml config file")
                .global(true),
        )
        .arg(
            Arg::new("list")
                .short('l')
                .long("list")
                .help("List all available tasks")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print command output and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print verbose output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-dedupe")
                .long("no-dedupe")
                .help("Run duplicate pre-tasks instead of skipping them")
                .action(ArgAction::SetTrue)
                .global(true),
        );

    let mut info = Vec::new();
    collect_task_info(collection, "", &mut info);

    for task_info in info {
        let mut task_cmd = Command::new(task_info.path.clone())
            .about(task_info.task.usage().unwrap_or_default().to_string());

        if !task_info.aliases.is_empty() {
            task_cmd = task_cmd.visible_aliases(task_info.aliases.clone());
        }

        // Positional-override params come first, in the declared order; the
        // remaining params become long flags.
        let positional: Vec<&str> = task_info
            .task
            .positional()
            .map(|names| names.iter().map(String::as_str).collect())
            .unwrap_or_default();

        for name in &positional {
            if let Some(param) = task_info.task.params().iter().find(|p| &p.name == name) {
                let mut arg = Arg::new(param.name.clone()).value_name(param.name.to_uppercase());
                if let Some(default) = &param.default {
                    arg = arg.default_value(default.clone());
                }
                task_cmd = task_cmd.arg(arg);
            }
        }

        for param in task_info.task.params() {
            if positional.iter().any(|name| name == &param.name) {
                continue;
            }
            let mut arg = Arg::new(param.name.clone())
                .long(param.name.clone())
                .value_name(param.name.to_uppercase());
            if let Some(default) = &param.default {
                arg = arg.default_value(default.clone());
            }
            task_cmd = task_cmd.arg(arg);
        }

        cmd = cmd.subcommand(task_cmd);
    }

    cmd
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Collect keyword arguments for a task from parsed CLI matches
fn parse_task_kwargs(task: &Task, matches: &ArgMatches) -> HashMap<String, String> {
    let mut kwargs = HashMap::new();
    for param in task.params() {
        if let Some(value) = matches.get_one::<String>(&param.name) {
            kwargs.insert(param.name.clone(), value.clone());
        }
    }
    kwargs
}

/// Print the namespace tree as a flat task listing
fn print_listing(collection: &Collection) {
    let mut info = Vec::new();
    collect_task_info(collection, "", &mut info);

    if info.is_empty() {
        println!("{}", "No tasks defined".dimmed());
        return;
    }

    println!("{}", "Available tasks:".bold());
    for task_info in info {
        let mut line = format!("  {}", task_info.path.green());
        if !task_info.aliases.is_empty() {
            line.push_str(&format!(" ({})", task_info.aliases.join(", ").cyan()));
        }
        if task_info.default {
            line.push_str(&format!(" {}", "[default]".yellow()));
        }
        if let Some(usage) = task_info.task.usage() {
            line.push_str(&format!("  {}", usage.dimmed()));
        }
        println!("{}", line);
    }
}

/// Run the CLI application with provided arguments
pub fn run() -> Result<()> {
    // Check if --file flag is provided first
    let args: Vec<String> = std::env::args().collect();
    let file_path = extract_file_arg(&args);

    let app = if let Some(path) = file_path {
        App::with_config_file(path)?
    } else {
        App::new()?
    };

    app.run()
}

/// Extract --file argument before clap parsing
fn extract_file_arg(args: &[String]) -> Option<PathBuf> {
    for i in 0..args.len() {
        if (args[i] == "--file" || args[i] == "-f") && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
    }
    None
}
