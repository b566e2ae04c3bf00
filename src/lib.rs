//! dagwright - JSON Workflow to Airflow DAG Converter
//!
//! A one-shot batch tool that unpacks archived JSON workflow descriptions
//! and generates an Airflow DAG module for each, keeping a ledger so a
//! workflow is only generated once unless explicitly forced.
//!
//! # Architecture
//!
//! - [`workflow`]: workflow document model, loading and the processing ledger
//! - [`codegen`]: translation of a document into DAG source text
//! - [`driver`]: archive intake, per-archive state machine, cleanup
//! - [`config`]: run configuration read once from the environment
//! - [`error`]: error types
//!
//! # Example
//!
//! ```rust
//! use dagwright::codegen::translate;
//! use dagwright::workflow::{CallableDef, DagSettings, TaskNode, WorkflowSpec};
//!
//! let spec = WorkflowSpec::new(DagSettings::new("sample", "@daily", "False"))
//!     .with_argument("owner", "bob")
//!     .with_definition(CallableDef::command("say_hi", "print('hi')"))
//!     .with_task(TaskNode::python("t1", "task_one", "say_hi"));
//!
//! let script = translate(&spec);
//! assert!(script.contains("dag.catchup = False"));
//! ```

pub mod codegen;
pub mod config;
pub mod driver;
pub mod error;
pub mod workflow;

// Re-export commonly used types
pub use codegen::translate;
pub use config::ConverterConfig;
pub use driver::{BatchReport, Driver};
pub use error::ConverterError;
pub use workflow::{load_spec, WorkflowSpec};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "dagwright";
