//! Batch Conversion Module
//!
//! Everything around the translation engine: finding and unpacking
//! archives, running each through the ledger and generator, and cleaning
//! up after it.
//!
//! # Architecture
//!
//! - [`intake`]: archive discovery and extraction
//! - [`runner`]: the per-archive state machine
//! - [`staging`]: script relocation and staging cleanup
//! - [`report`]: stage transitions and outcomes of a batch

pub mod intake;
pub mod report;
pub mod runner;
pub mod staging;

pub use report::{ArchiveOutcome, ArchiveStage, BatchReport};
pub use runner::{Driver, RunContext};
