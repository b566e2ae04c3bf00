//! Workflow Document Module
//!
//! Data structures for the JSON workflow documents found in archives,
//! along with loading them and tracking which ones were already converted.
//!
//! # Structure
//!
//! - [`model`]: document structures (WorkflowSpec, TaskNode, ...)
//! - [`parser`]: loading documents from disk
//! - [`validator`]: reference checks reported as warnings
//! - [`ledger`]: the processing ledger

pub mod ledger;
pub mod model;
pub mod parser;
pub mod validator;

pub use ledger::{LedgerStatus, ProcessingLedger};
pub use model::{
    CallableDef, DagSettings, ImportFrom, LinkSpec, OperatorKind, TaskNode, WorkflowSpec,
};
pub use parser::{load_spec, parse_spec};
pub use validator::{check_references, ReferenceWarning};
