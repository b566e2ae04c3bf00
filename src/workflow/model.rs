//! Workflow Document Model
//!
//! Structures mirroring the JSON workflow document shipped inside each
//! archive. Field names follow the document; ordering of every list and of
//! `scheduler_arguments` is kept exactly as written.
//!
//! # Example Document
//!
//! ```json
//! {
//!   "imports": ["os"],
//!   "import_from": [{"file": "datetime", "class": "timedelta"}],
//!   "scheduler_arguments": {"owner": "bob", "retries": 3, "retry_delay": 5},
//!   "dag": {"name": "sample", "schedule": "@daily", "catchup": "False"},
//!   "definitions": [{"name": "say_hi", "command": "print('hi')"}],
//!   "tasks": [
//!     {"name": "t1", "id": "task_one", "operator": "python", "definition": "say_hi",
//!      "link": [{"type": "set_downstream", "name": "t2"}]},
//!     {"name": "t2", "id": "task_two", "operator": "bash", "definition": "echo done"}
//!   ]
//! }
//! ```

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A complete workflow document, the unit of translation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkflowSpec {
    /// Modules imported verbatim (`import X`)
    pub imports: Vec<String>,

    /// Symbols imported from modules (`from X import Y`)
    pub import_from: Vec<ImportFrom>,

    /// Default arguments handed to every task, in document order
    pub scheduler_arguments: Map<String, Value>,

    /// Graph identity and scheduling
    pub dag: DagSettings,

    /// Callables referenced by python tasks
    pub definitions: Vec<CallableDef>,

    /// Task nodes in declaration order
    pub tasks: Vec<TaskNode>,
}

/// A `from <module> import <symbol>` pair.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ImportFrom {
    #[serde(rename = "file")]
    pub module: String,

    #[serde(rename = "class")]
    pub symbol: String,
}

/// Name, schedule and catchup flag of the generated graph.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DagSettings {
    pub name: String,

    /// Schedule expression (cron string or preset such as `@daily`)
    pub schedule: String,

    /// Emitted as-is; the document author decides between `False` and `'False'`
    #[serde(deserialize_with = "raw_text")]
    pub catchup: String,
}

/// A generated Python callable.
///
/// Either `command` is emitted verbatim as the body, or `class` is
/// instantiated and each of `methods` invoked on it. Both may be present.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CallableDef {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
}

/// Which Airflow operator a task is rendered with.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OperatorKind {
    Python,
    Bash,
}

/// A single task node of the workflow.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    /// Python variable the operator is assigned to
    pub name: String,

    /// Scheduler-visible task id
    pub id: String,

    pub operator: OperatorKind,

    /// Callable name for python tasks, shell command for bash tasks
    pub definition: String,

    /// Outgoing dependency links
    #[serde(rename = "link", default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<LinkSpec>,
}

/// A dependency edge declared on a task: `<task>.<dependency>(<target>)`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LinkSpec {
    /// Dependency method, e.g. `set_upstream` or `set_downstream`
    #[serde(rename = "type")]
    pub dependency: String,

    /// Variable name of the other task
    #[serde(rename = "name")]
    pub target: String,
}

/// Accepts a string as-is, or renders a bool/number the way Python prints it.
fn raw_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Bool(true) => Ok("True".to_string()),
        Value::Bool(false) => Ok("False".to_string()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(de::Error::custom("Expected string, boolean or number")),
    }
}

impl WorkflowSpec {
    /// Creates an empty workflow for the given graph settings.
    pub fn new(dag: DagSettings) -> Self {
        Self {
            imports: Vec::new(),
            import_from: Vec::new(),
            scheduler_arguments: Map::new(),
            dag,
            definitions: Vec::new(),
            tasks: Vec::new(),
        }
    }

    /// Appends a plain module import.
    pub fn with_import(mut self, module: impl Into<String>) -> Self {
        self.imports.push(module.into());
        self
    }

    /// Appends a `from module import symbol` import.
    pub fn with_import_from(mut self, module: impl Into<String>, symbol: impl Into<String>) -> Self {
        self.import_from.push(ImportFrom {
            module: module.into(),
            symbol: symbol.into(),
        });
        self
    }

    /// Appends a scheduler argument, keeping insertion order.
    pub fn with_argument(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.scheduler_arguments.insert(key.into(), value.into());
        self
    }

    /// Appends a callable definition.
    pub fn with_definition(mut self, definition: CallableDef) -> Self {
        self.definitions.push(definition);
        self
    }

    /// Appends a task.
    pub fn with_task(mut self, task: TaskNode) -> Self {
        self.tasks.push(task);
        self
    }

    /// Looks up a task by its variable name.
    pub fn get_task(&self, name: &str) -> Option<&TaskNode> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Looks up a callable definition by name.
    pub fn get_definition(&self, name: &str) -> Option<&CallableDef> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Total number of dependency links across all tasks.
    pub fn link_count(&self) -> usize {
        self.tasks.iter().map(|t| t.links.len()).sum()
    }
}

impl DagSettings {
    pub fn new(
        name: impl Into<String>,
        schedule: impl Into<String>,
        catchup: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            schedule: schedule.into(),
            catchup: catchup.into(),
        }
    }
}

impl CallableDef {
    /// A callable whose body is a single raw statement.
    pub fn command(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: Some(command.into()),
            class_name: None,
            methods: Vec::new(),
        }
    }

    /// A callable that instantiates `class_name` and calls `methods` in order.
    pub fn class(name: impl Into<String>, class_name: impl Into<String>, methods: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command: None,
            class_name: Some(class_name.into()),
            methods,
        }
    }
}

impl TaskNode {
    /// A task running a Python callable.
    pub fn python(name: impl Into<String>, id: impl Into<String>, callable: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            operator: OperatorKind::Python,
            definition: callable.into(),
            links: Vec::new(),
        }
    }

    /// A task running a shell command.
    pub fn bash(name: impl Into<String>, id: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            operator: OperatorKind::Bash,
            definition: command.into(),
            links: Vec::new(),
        }
    }

    /// Adds a dependency link to another task.
    pub fn with_link(mut self, dependency: impl Into<String>, target: impl Into<String>) -> Self {
        self.links.push(LinkSpec {
            dependency: dependency.into(),
            target: target.into(),
        });
        self
    }
}
