//! Reference Checks
//!
//! The generator never rejects a document because of a dangling name; the
//! target engine is the one that fails on those. These checks only exist
//! so the operator sees the problem in the converter's log.

use std::collections::HashSet;
use std::fmt;

use super::model::{OperatorKind, WorkflowSpec};

/// A suspicious reference found in a workflow document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceWarning {
    UnknownLinkTarget { task: String, target: String },
    UnknownCallable { task: String, callable: String },
    DuplicateTaskName(String),
}

impl fmt::Display for ReferenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownLinkTarget { task, target } => {
                write!(f, "Task '{}' links to unknown task '{}'", task, target)
            }
            Self::UnknownCallable { task, callable } => {
                write!(f, "Task '{}' calls undefined callable '{}'", task, callable)
            }
            Self::DuplicateTaskName(name) => write!(f, "Task name '{}' is declared twice", name),
        }
    }
}

/// Collects dangling link targets, undefined callables and duplicate task names.
pub fn check_references(spec: &WorkflowSpec) -> Vec<ReferenceWarning> {
    let mut warnings = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for task in &spec.tasks {
        if !seen.insert(task.name.as_str()) {
            warnings.push(ReferenceWarning::DuplicateTaskName(task.name.clone()));
        }
    }

    for task in &spec.tasks {
        if task.operator == OperatorKind::Python && spec.get_definition(&task.definition).is_none() {
            warnings.push(ReferenceWarning::UnknownCallable {
                task: task.name.clone(),
                callable: task.definition.clone(),
            });
        }

        for link in &task.links {
            if spec.get_task(&link.target).is_none() {
                warnings.push(ReferenceWarning::UnknownLinkTarget {
                    task: task.name.clone(),
                    target: link.target.clone(),
                });
            }
        }
    }

    warnings
}
