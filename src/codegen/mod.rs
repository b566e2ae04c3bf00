//! DAG Code Generation
//!
//! Turns a [`WorkflowSpec`](crate::workflow::WorkflowSpec) into the text of
//! an Airflow DAG module in two stages:
//!
//! - [`script`]: maps the document onto a [`DagScript`], a structured view
//!   of everything the generated module declares
//! - [`render`]: serializes a [`DagScript`] to Python source
//!
//! Both stages are pure; the same document always yields the same bytes.

pub mod render;
pub mod script;

pub use script::{
    ArgValue, Callable, DagDecl, DagScript, DefaultArg, DependencyEdge, FromImport,
    OperatorBinding, OperatorNode, Statement,
};

use crate::workflow::WorkflowSpec;

/// Extension of generated scripts.
pub const SCRIPT_EXTENSION: &str = "py";

/// Translates a workflow document into DAG source text.
pub fn translate(spec: &WorkflowSpec) -> String {
    DagScript::from_spec(spec).render()
}

/// File name of the generated script for a workflow, e.g. `sample_dag.py`.
pub fn script_file_name(workflow_id: &str) -> String {
    format!("{}_dag.{}", workflow_id, SCRIPT_EXTENSION)
}
