//! Processing Ledger
//!
//! Append-only text file listing the workflow identifiers that already have
//! a generated DAG, one per line. It decides whether an archive needs
//! translation and is only ever appended to.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::error::LedgerError;

/// Outcome of a ledger lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerStatus {
    /// Never generated; translate and record
    NotProcessed,
    /// Already generated; skip
    Processed,
    /// Already generated but forced; translate without recording again
    ProcessedForceOverride,
}

impl LedgerStatus {
    /// Whether the translation engine should run.
    pub fn should_translate(self) -> bool {
        matches!(self, Self::NotProcessed | Self::ProcessedForceOverride)
    }

    /// Whether a successful translation must be appended to the ledger.
    pub fn should_record(self) -> bool {
        self == Self::NotProcessed
    }
}

/// Handle to the ledger file. The file is created lazily on first record.
#[derive(Debug, Clone)]
pub struct ProcessingLedger {
    path: PathBuf,
}

impl ProcessingLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the ledger; `None` when the file does not exist yet.
    fn read(&self) -> Result<Option<String>, LedgerError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(LedgerError::Unreadable {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// All recorded identifiers in file order, duplicates included.
    pub fn entries(&self) -> Result<Vec<String>, LedgerError> {
        Ok(self
            .read()?
            .map(|content| {
                content
                    .lines()
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Decides what to do with `workflow_id`.
    ///
    /// A missing ledger file means nothing has been processed yet. A ledger
    /// that exists but cannot be read is an error, never `NotProcessed`.
    pub fn status(&self, workflow_id: &str, force_requested: bool) -> Result<LedgerStatus, LedgerError> {
        let Some(content) = self.read()? else {
            info!(
                "Processed file not found. Will be created: {}",
                self.path.display()
            );
            return Ok(LedgerStatus::NotProcessed);
        };

        if !content.lines().any(|line| line == workflow_id) {
            return Ok(LedgerStatus::NotProcessed);
        }

        if force_requested {
            info!("Force flag found for '{}'. Start DAG creation", workflow_id);
            Ok(LedgerStatus::ProcessedForceOverride)
        } else {
            Ok(LedgerStatus::Processed)
        }
    }

    /// Appends `workflow_id` as a new line, creating the file if needed.
    pub fn record(&self, workflow_id: &str) -> Result<(), LedgerError> {
        let append_err = |source: io::Error| LedgerError::Append {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(append_err)?;
        }

        // A hand-edited ledger may lack its final newline.
        let needs_separator = fs::read(&self.path)
            .map(|bytes| bytes.last().is_some_and(|b| *b != b'\n'))
            .unwrap_or(false);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(append_err)?;

        let line = if needs_separator {
            format!("\n{}\n", workflow_id)
        } else {
            format!("{}\n", workflow_id)
        };
        file.write_all(line.as_bytes()).map_err(append_err)?;

        debug!("Recorded '{}' in {}", workflow_id, self.path.display());
        Ok(())
    }
}
