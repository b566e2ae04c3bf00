//! Workflow Document Parser
//!
//! Loads a JSON workflow document from disk. Any failure, whether I/O,
//! syntax, a missing field or an unknown operator, is reported as a
//! [`SpecError`] so the driver can abandon the archive without touching
//! the ledger.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use super::model::WorkflowSpec;
use super::validator::check_references;
use crate::error::SpecError;

/// Loads and parses a workflow document.
///
/// Dangling references are logged as warnings but do not fail the load.
///
/// # Example
///
/// ```rust,no_run
/// use dagwright::workflow::load_spec;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let spec = load_spec("staging/sample/sample.json")?;
///     println!("Loaded {} tasks", spec.tasks.len());
///     Ok(())
/// }
/// ```
pub fn load_spec(path: impl AsRef<Path>) -> Result<WorkflowSpec, SpecError> {
    let path = path.as_ref();
    info!("Loading workflow document: {}", path.display());

    let content = fs::read_to_string(path).map_err(|source| SpecError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Workflow document loaded ({} bytes)", content.len());

    let spec = parse_spec(&content, path)?;

    info!(
        "Parsed {} definitions, {} tasks, {} links",
        spec.definitions.len(),
        spec.tasks.len(),
        spec.link_count()
    );

    for warning in check_references(&spec) {
        warn!("{}", warning);
    }

    Ok(spec)
}

/// Parses document text; `origin` is only used in error messages.
pub fn parse_spec(content: &str, origin: &Path) -> Result<WorkflowSpec, SpecError> {
    serde_json::from_str(content).map_err(|source| SpecError::Malformed {
        path: origin.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const VALID: &str = r#"{
        "imports": ["os"],
        "import_from": [],
        "scheduler_arguments": {"owner": "bob"},
        "dag": {"name": "sample", "schedule": "@daily", "catchup": "False"},
        "definitions": [{"name": "say_hi", "command": "print('hi')"}],
        "tasks": [{"name": "t1", "id": "task_one", "operator": "python", "definition": "say_hi"}]
    }"#;

    #[test]
    fn test_load_spec_valid() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("sample.json");
        fs::write(&path, VALID).unwrap();

        let spec = load_spec(&path).unwrap();
        assert_eq!(spec.dag.name, "sample");
        assert_eq!(spec.tasks.len(), 1);
    }

    #[test]
    fn test_load_spec_file_not_found() {
        let result = load_spec("/nonexistent/path/sample.json");
        assert!(matches!(result, Err(SpecError::Read { .. })));
    }

    #[test]
    fn test_load_spec_invalid_json() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "{ this is not json").unwrap();

        let result = load_spec(&path);
        assert!(matches!(result, Err(SpecError::Malformed { .. })));
    }

    #[test]
    fn test_parse_spec_missing_required_field() {
        let without_tasks = r#"{
            "imports": [], "import_from": [], "scheduler_arguments": {},
            "dag": {"name": "d", "schedule": "@once", "catchup": "False"},
            "definitions": []
        }"#;

        let result = parse_spec(without_tasks, Path::new("d.json"));
        let err = result.unwrap_err();
        assert!(err.to_string().contains("tasks"));
    }

    #[test]
    fn test_parse_spec_dangling_link_is_accepted() {
        let content = r#"{
            "imports": [], "import_from": [], "scheduler_arguments": {},
            "dag": {"name": "d", "schedule": "@once", "catchup": "False"},
            "definitions": [],
            "tasks": [{"name": "t1", "id": "a", "operator": "bash", "definition": "ls",
                       "link": [{"type": "set_downstream", "name": "ghost"}]}]
        }"#;

        let spec = parse_spec(content, Path::new("d.json")).unwrap();
        assert_eq!(spec.link_count(), 1);
    }
}
