//! Structured DAG Script
//!
//! [`DagScript`] holds what a generated module declares, in emission order,
//! without committing to any text layout. Tests assert on this structure;
//! [`render`](super::render) owns the formatting.

use serde_json::Value;

use crate::workflow::{CallableDef, OperatorKind, TaskNode, WorkflowSpec};

/// `from <module> import <symbol>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FromImport {
    pub module: String,
    pub symbol: String,
}

/// How a default-argument value is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// Wrapped in single quotes (`owner`)
    Quoted(String),
    /// `timedelta(minutes=<n>)` (`retry_delay`)
    Minutes(String),
    /// Written as-is
    Literal(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultArg {
    pub key: String,
    pub value: ArgValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagDecl {
    pub name: String,
    pub schedule: String,
    pub catchup: String,
}

/// One statement inside a generated callable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Raw source line from the document
    Raw(String),
    /// `<var> = <class_name>()`
    Instantiate { var: String, class_name: String },
    /// `<var>.<method>()`
    MethodCall { var: String, method: String },
    /// Body placeholder for a callable with nothing else in it
    Pass,
}

/// `def <name>(ds, **kwargs):` followed by its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Callable {
    pub name: String,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorBinding {
    Python { callable: String },
    Bash { command: String },
}

/// `<var> = <Operator>(task_id='<task_id>', ..., dag=dag)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorNode {
    pub var: String,
    pub task_id: String,
    pub binding: OperatorBinding,
}

/// `<source>.<method>(<target>)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub source: String,
    pub method: String,
    pub target: String,
}

/// Everything a generated DAG module declares, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DagScript {
    pub imports: Vec<String>,
    pub from_imports: Vec<FromImport>,
    pub default_args: Vec<DefaultArg>,
    pub dag: DagDecl,
    pub callables: Vec<Callable>,
    pub operators: Vec<OperatorNode>,
    pub edges: Vec<DependencyEdge>,
}

impl DagScript {
    /// Maps a workflow document onto its script structure.
    pub fn from_spec(spec: &WorkflowSpec) -> Self {
        Self {
            imports: spec.imports.clone(),
            from_imports: spec
                .import_from
                .iter()
                .map(|i| FromImport {
                    module: i.module.clone(),
                    symbol: i.symbol.clone(),
                })
                .collect(),
            default_args: spec
                .scheduler_arguments
                .iter()
                .map(|(key, value)| DefaultArg::new(key, value))
                .collect(),
            dag: DagDecl {
                name: spec.dag.name.clone(),
                schedule: spec.dag.schedule.clone(),
                catchup: spec.dag.catchup.clone(),
            },
            callables: spec.definitions.iter().map(Callable::from_definition).collect(),
            operators: spec.tasks.iter().map(OperatorNode::from_task).collect(),
            edges: spec
                .tasks
                .iter()
                .flat_map(|task| {
                    task.links.iter().map(move |link| DependencyEdge {
                        source: task.name.clone(),
                        method: link.dependency.clone(),
                        target: link.target.clone(),
                    })
                })
                .collect(),
        }
    }
}

impl DefaultArg {
    /// `owner` is quoted, `retry_delay` becomes minutes, anything else is literal.
    pub fn new(key: &str, value: &Value) -> Self {
        let text = python_text(value, false);
        let value = match key {
            "owner" => ArgValue::Quoted(text),
            "retry_delay" => ArgValue::Minutes(text),
            _ => ArgValue::Literal(text),
        };
        Self {
            key: key.to_string(),
            value,
        }
    }
}

impl Callable {
    fn from_definition(def: &CallableDef) -> Self {
        let mut body = Vec::new();

        if let Some(command) = &def.command {
            body.push(Statement::Raw(command.clone()));
        }

        if let Some(class_name) = &def.class_name {
            let var: String = class_name.chars().take(1).collect();
            body.push(Statement::Instantiate {
                var: var.clone(),
                class_name: class_name.clone(),
            });
            body.extend(def.methods.iter().map(|method| Statement::MethodCall {
                var: var.clone(),
                method: method.clone(),
            }));
        }

        if body.is_empty() {
            body.push(Statement::Pass);
        }

        Self {
            name: def.name.clone(),
            body,
        }
    }
}

impl OperatorNode {
    fn from_task(task: &TaskNode) -> Self {
        let binding = match task.operator {
            OperatorKind::Python => OperatorBinding::Python {
                callable: task.definition.clone(),
            },
            OperatorKind::Bash => OperatorBinding::Bash {
                command: task.definition.clone(),
            },
        };
        Self {
            var: task.name.clone(),
            task_id: task.id.clone(),
            binding,
        }
    }
}

/// Text Python's `str()` would produce for a JSON value.
///
/// Top-level strings are written bare; strings nested in a list or dict are
/// quoted the way Python prints container members.
pub fn python_text(value: &Value, nested: bool) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if nested => {
            format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(|v| python_text(v, true)).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => {
            let parts: Vec<String> = map
                .iter()
                .map(|(k, v)| {
                    let key = python_text(&Value::String(k.clone()), true);
                    format!("{}: {}", key, python_text(v, true))
                })
                .collect();
            format!("{{{}}}", parts.join(", "))
        }
    }
}
