//! Batch Report
//!
//! Records which stage each archive reached, and when, plus the final
//! outcome per archive. Used for the end-of-run summary.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Stages an archive passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveStage {
    Discovered,
    Extracted,
    LedgerChecked,
    Skipped,
    Translated,
    Relocated,
    CleanedUp,
}

/// Final result for one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    /// Script written; `ledger_updated` is false for forced regeneration
    Translated { output: PathBuf, ledger_updated: bool },
    /// Translated in dry run mode, nothing written
    Previewed,
    /// Already in the ledger and not forced
    Skipped,
    Failed { reason: String },
}

impl ArchiveOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for ArchiveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Translated {
                output,
                ledger_updated: true,
            } => write!(f, "created {}", output.display()),
            Self::Translated {
                output,
                ledger_updated: false,
            } => write!(f, "regenerated {} (forced)", output.display()),
            Self::Previewed => write!(f, "translated (dry run)"),
            Self::Skipped => write!(f, "skipped (already processed)"),
            Self::Failed { reason } => write!(f, "FAILED: {}", reason),
        }
    }
}

/// A stage transition for one archive.
#[derive(Debug, Clone)]
pub struct StageEvent {
    pub workflow_id: String,
    pub stage: ArchiveStage,
    pub timestamp: Instant,
}

/// Everything that happened during one batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    events: Vec<StageEvent>,
    outcomes: Vec<(String, ArchiveOutcome)>,
    start_time: Instant,
}

impl BatchReport {
    /// Creates an empty report starting now.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            outcomes: Vec::new(),
            start_time: Instant::now(),
        }
    }

    /// Records that `workflow_id` reached `stage`.
    pub fn record_stage(&mut self, workflow_id: &str, stage: ArchiveStage) {
        self.events.push(StageEvent {
            workflow_id: workflow_id.to_string(),
            stage,
            timestamp: Instant::now(),
        });
    }

    /// Records the final outcome for `workflow_id`.
    pub fn record_outcome(&mut self, workflow_id: &str, outcome: ArchiveOutcome) {
        self.outcomes.push((workflow_id.to_string(), outcome));
    }

    /// Outcomes in processing order.
    pub fn outcomes(&self) -> &[(String, ArchiveOutcome)] {
        &self.outcomes
    }

    /// Outcome of the most recent run of `workflow_id`.
    pub fn outcome(&self, workflow_id: &str) -> Option<&ArchiveOutcome> {
        self.outcomes
            .iter()
            .rev()
            .find(|(id, _)| id == workflow_id)
            .map(|(_, outcome)| outcome)
    }

    /// Stages reached by `workflow_id`, in order.
    pub fn stages(&self, workflow_id: &str) -> Vec<ArchiveStage> {
        self.events
            .iter()
            .filter(|e| e.workflow_id == workflow_id)
            .map(|e| e.stage)
            .collect()
    }

    pub fn translated_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ArchiveOutcome::Translated { .. } | ArchiveOutcome::Previewed))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| *o == ArchiveOutcome::Skipped)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// Time since the report was created.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Milliseconds from first to last recorded stage, per archive.
    pub fn durations(&self) -> HashMap<String, u128> {
        let mut spans: HashMap<String, (Instant, Instant)> = HashMap::new();

        for event in &self.events {
            spans
                .entry(event.workflow_id.clone())
                .and_modify(|span| span.1 = event.timestamp)
                .or_insert((event.timestamp, event.timestamp));
        }

        spans
            .into_iter()
            .map(|(id, (start, end))| (id, end.duration_since(start).as_millis()))
            .collect()
    }

    /// Human-readable summary of the batch.
    pub fn summary(&self) -> String {
        let durations = self.durations();
        let mut output = String::from("\nConversion Summary:\n\n");

        for (id, outcome) in &self.outcomes {
            let ms = durations.get(id).copied().unwrap_or(0);
            output.push_str(&format!("{:20} {} ({} ms)\n", truncate(id, 20), outcome, ms));
        }

        output.push_str(&format!(
            "\n{} archive(s): {} translated, {} skipped, {} failed in {} ms\n",
            self.outcomes.len(),
            self.translated_count(),
            self.skipped_count(),
            self.failed_count(),
            self.elapsed().as_millis()
        ));
        output
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Pads or truncates a string to exactly `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
