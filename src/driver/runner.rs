//! Batch Driver
//!
//! Runs every discovered archive through
//! `Discovered → Extracted → LedgerChecked → {Skipped | Translated} →
//! Relocated → CleanedUp`, one archive at a time. A failing archive is
//! reported and the batch moves on; relocation and cleanup run for every
//! archive that reached the staging area.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use super::intake::{discover_archives, extract_archive, workflow_id};
use super::report::{ArchiveOutcome, ArchiveStage, BatchReport};
use super::staging::{has_force_marker, purge, relocate_scripts};
use crate::codegen::{script_file_name, translate};
use crate::config::ConverterConfig;
use crate::error::ConverterError;
use crate::workflow::{load_spec, LedgerStatus, ProcessingLedger};

/// Per-archive facts the driver hands to the ledger and translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    pub workflow_id: String,
    pub force_requested: bool,
}

impl RunContext {
    /// Builds the context for an extracted archive.
    ///
    /// Force is requested by a `force.flag` in the archive or globally.
    pub fn for_staged(workflow_id: impl Into<String>, staging_dir: &Path, force_all: bool) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            force_requested: force_all || has_force_marker(staging_dir),
        }
    }
}

/// Converts all pending archives described by a [`ConverterConfig`].
///
/// # Example
///
/// ```rust,no_run
/// use dagwright::config::ConverterConfig;
/// use dagwright::driver::Driver;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ConverterConfig::from_env()?;
///     let report = Driver::new(&config).run()?;
///     println!("{}", report.summary());
///     Ok(())
/// }
/// ```
pub struct Driver<'a> {
    config: &'a ConverterConfig,
    ledger: ProcessingLedger,
}

impl<'a> Driver<'a> {
    pub fn new(config: &'a ConverterConfig) -> Self {
        Self {
            config,
            ledger: ProcessingLedger::new(&config.ledger_path),
        }
    }

    /// Processes every archive in the input directory.
    ///
    /// Only a failure to list the archives or to create the staging
    /// directory aborts the batch; per-archive errors end up in the report.
    pub fn run(&self) -> Result<BatchReport, ConverterError> {
        let archives = discover_archives(&self.config.archive_dir)?;

        fs::create_dir_all(&self.config.staging_dir).map_err(|source| {
            ConverterError::Directory {
                path: self.config.staging_dir.clone(),
                source,
            }
        })?;

        if self.config.dry_run {
            info!("Mode: DRY RUN (no scripts written, ledger untouched)");
        }

        let mut report = BatchReport::new();
        for archive in &archives {
            self.process_archive(archive, &mut report);
        }

        match self.ledger.entries() {
            Ok(entries) => info!("Ledger holds {} workflow(s)", entries.len()),
            Err(e) => warn!("{}", e),
        }

        Ok(report)
    }

    /// Runs one archive through the full state machine.
    pub fn process_archive(&self, archive: &Path, report: &mut BatchReport) -> ArchiveOutcome {
        let id = match workflow_id(archive) {
            Ok(id) => id,
            Err(e) => {
                error!("{}", e);
                let outcome = ArchiveOutcome::Failed {
                    reason: e.to_string(),
                };
                report.record_outcome(&archive.display().to_string(), outcome.clone());
                return outcome;
            }
        };

        info!("Processing archive: {}", archive.display());
        report.record_stage(&id, ArchiveStage::Discovered);

        let staging_dir = self.config.staging_dir.join(&id);
        if staging_dir.exists() {
            debug!("Removing stale staging directory {}", staging_dir.display());
            purge(&staging_dir);
        }

        let outcome = match self.convert(archive, &id, &staging_dir, report) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Archive '{}' failed: {}", id, e);
                ArchiveOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };

        if !self.config.dry_run {
            relocate_scripts(&staging_dir, &self.config.scripts_dir);
        }
        report.record_stage(&id, ArchiveStage::Relocated);

        let failures = purge(&staging_dir);
        if failures > 0 {
            warn!("{} staged entries of '{}' could not be removed", failures, id);
        }
        report.record_stage(&id, ArchiveStage::CleanedUp);

        report.record_outcome(&id, outcome.clone());
        outcome
    }

    /// Extract, consult the ledger and translate if needed.
    fn convert(
        &self,
        archive: &Path,
        id: &str,
        staging_dir: &Path,
        report: &mut BatchReport,
    ) -> Result<ArchiveOutcome, ConverterError> {
        extract_archive(archive, staging_dir)?;
        report.record_stage(id, ArchiveStage::Extracted);

        let ctx = RunContext::for_staged(id, staging_dir, self.config.force_all);
        let status = self.ledger.status(&ctx.workflow_id, ctx.force_requested)?;
        report.record_stage(id, ArchiveStage::LedgerChecked);
        debug!("Ledger status for '{}': {:?}", id, status);

        if !status.should_translate() {
            info!(
                "DAG '{}' already created! For overwrite add force.flag to your zip-file!",
                id
            );
            report.record_stage(id, ArchiveStage::Skipped);
            return Ok(ArchiveOutcome::Skipped);
        }

        let outcome = self.translate_staged(&ctx, staging_dir, status)?;
        report.record_stage(id, ArchiveStage::Translated);
        Ok(outcome)
    }

    /// Loads `<id>.json`, writes `<id>_dag.py` and updates the ledger.
    fn translate_staged(
        &self,
        ctx: &RunContext,
        staging_dir: &Path,
        status: LedgerStatus,
    ) -> Result<ArchiveOutcome, ConverterError> {
        let spec = load_spec(staging_dir.join(format!("{}.json", ctx.workflow_id)))?;
        let script = translate(&spec);

        if self.config.dry_run {
            debug!("Generated DAG for '{}':\n{}", ctx.workflow_id, script);
            return Ok(ArchiveOutcome::Previewed);
        }

        let output = self.write_script(&ctx.workflow_id, &script)?;

        let ledger_updated = status.should_record();
        if ledger_updated {
            self.ledger.record(&ctx.workflow_id)?;
        }

        info!("Finished DAG creation: {}", output.display());
        Ok(ArchiveOutcome::Translated {
            output,
            ledger_updated,
        })
    }

    fn write_script(&self, workflow_id: &str, script: &str) -> Result<PathBuf, ConverterError> {
        let output_dir = &self.config.output_dir;
        fs::create_dir_all(output_dir).map_err(|source| ConverterError::Directory {
            path: output_dir.clone(),
            source,
        })?;

        let path = output_dir.join(script_file_name(workflow_id));
        fs::write(&path, script).map_err(|source| ConverterError::Output {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::{tempdir, TempDir};
    use zip::write::SimpleFileOptions;

    const SAMPLE: &str = r#"{
        "imports": [],
        "import_from": [],
        "scheduler_arguments": {"owner": "bob"},
        "dag": {"name": "sample", "schedule": "@daily", "catchup": "False"},
        "definitions": [{"name": "say_hi", "command": "print('hi')"}],
        "tasks": [{"name": "t1", "id": "task_one", "operator": "python", "definition": "say_hi"}]
    }"#;

    fn setup() -> (TempDir, ConverterConfig) {
        let temp_dir = tempdir().unwrap();
        let root = temp_dir.path();
        fs::create_dir(root.join("zip")).unwrap();
        let config = ConverterConfig {
            archive_dir: root.join("zip"),
            staging_dir: root.join("in"),
            output_dir: root.join("out"),
            ledger_path: root.join("processed.txt"),
            scripts_dir: root.join("scripts"),
            force_all: false,
            dry_run: false,
        };
        (temp_dir, config)
    }

    fn write_zip(path: &Path, files: &[(&str, &str)]) {
        let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in files {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_run_context_force_sources() {
        let temp_dir = tempdir().unwrap();
        assert!(!RunContext::for_staged("a", temp_dir.path(), false).force_requested);
        assert!(RunContext::for_staged("a", temp_dir.path(), true).force_requested);

        fs::write(temp_dir.path().join("force.flag"), "").unwrap();
        assert!(RunContext::for_staged("a", temp_dir.path(), false).force_requested);
    }

    #[test]
    fn test_state_machine_for_new_archive() {
        let (_temp, config) = setup();
        let archive = config.archive_dir.join("sample.zip");
        write_zip(&archive, &[("sample.json", SAMPLE)]);

        let driver = Driver::new(&config);
        let mut report = BatchReport::new();
        let outcome = driver.process_archive(&archive, &mut report);

        assert!(matches!(
            outcome,
            ArchiveOutcome::Translated {
                ledger_updated: true,
                ..
            }
        ));
        assert_eq!(
            report.stages("sample"),
            vec![
                ArchiveStage::Discovered,
                ArchiveStage::Extracted,
                ArchiveStage::LedgerChecked,
                ArchiveStage::Translated,
                ArchiveStage::Relocated,
                ArchiveStage::CleanedUp,
            ]
        );
        assert!(config.output_dir.join("sample_dag.py").exists());
        assert!(!config.staging_dir.join("sample").exists());
    }

    #[test]
    fn test_state_machine_for_processed_archive() {
        let (_temp, config) = setup();
        fs::write(&config.ledger_path, "sample\n").unwrap();
        let archive = config.archive_dir.join("sample.zip");
        write_zip(&archive, &[("sample.json", SAMPLE), ("task.sh", "echo hi")]);

        let driver = Driver::new(&config);
        let mut report = BatchReport::new();
        let outcome = driver.process_archive(&archive, &mut report);

        assert_eq!(outcome, ArchiveOutcome::Skipped);
        assert_eq!(
            report.stages("sample"),
            vec![
                ArchiveStage::Discovered,
                ArchiveStage::Extracted,
                ArchiveStage::LedgerChecked,
                ArchiveStage::Skipped,
                ArchiveStage::Relocated,
                ArchiveStage::CleanedUp,
            ]
        );
        assert!(!config.output_dir.join("sample_dag.py").exists());
        assert!(config.scripts_dir.join("task.sh").exists());
    }

    #[test]
    fn test_malformed_document_does_not_touch_ledger() {
        let (_temp, config) = setup();
        let archive = config.archive_dir.join("broken.zip");
        write_zip(&archive, &[("broken.json", "{\"imports\": []}"), ("job.py", "x = 1")]);

        let driver = Driver::new(&config);
        let mut report = BatchReport::new();
        let outcome = driver.process_archive(&archive, &mut report);

        assert!(outcome.is_failure());
        assert!(!config.ledger_path.exists());
        assert!(config.scripts_dir.join("job.py").exists());
        assert!(!config.staging_dir.join("broken").exists());
    }

    #[test]
    fn test_unreadable_ledger_fails_archive() {
        let (_temp, config) = setup();
        fs::create_dir(&config.ledger_path).unwrap();
        let archive = config.archive_dir.join("sample.zip");
        write_zip(&archive, &[("sample.json", SAMPLE)]);

        let driver = Driver::new(&config);
        let mut report = BatchReport::new();
        let outcome = driver.process_archive(&archive, &mut report);

        assert!(outcome.is_failure());
        assert!(!config.output_dir.join("sample_dag.py").exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let (_temp, config) = setup();
        let config = config.with_dry_run(true);
        let archive = config.archive_dir.join("sample.zip");
        write_zip(&archive, &[("sample.json", SAMPLE), ("job.py", "x = 1")]);

        let report = Driver::new(&config).run().unwrap();

        assert_eq!(report.outcome("sample"), Some(&ArchiveOutcome::Previewed));
        assert!(!config.output_dir.exists());
        assert!(!config.ledger_path.exists());
        assert!(!config.scripts_dir.exists());
        assert!(!config.staging_dir.join("sample").exists());
    }

    #[test]
    fn test_dot_named_archive_leaves_staging_parent_alone() {
        let (temp, config) = setup();
        let precious = temp.path().join("precious.txt");
        fs::write(&precious, "keep me").unwrap();
        write_zip(&config.archive_dir.join("...zip"), &[("x.json", SAMPLE)]);
        write_zip(&config.archive_dir.join("..zip"), &[("y.json", SAMPLE)]);

        let report = Driver::new(&config).run().unwrap();

        assert_eq!(report.failed_count(), 2);
        assert_eq!(fs::read_to_string(&precious).unwrap(), "keep me");
        assert!(config.archive_dir.join("...zip").exists());
        assert!(config.staging_dir.exists());
        assert!(!config.ledger_path.exists());
    }

    #[test]
    fn test_run_missing_archive_dir_is_fatal() {
        let (_temp, mut config) = setup();
        config.archive_dir = config.archive_dir.join("missing");

        let result = Driver::new(&config).run();
        assert!(matches!(result, Err(ConverterError::Intake(_))));
    }
}
