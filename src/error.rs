//! Error Types
//!
//! Each component reports failures through its own error enum; the
//! driver and CLI work with [`ConverterError`], which wraps all of them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A required configuration value was not supplied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
}

/// Failures while reading or appending to the processing ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger file '{path}' exists but could not be read: {source}")]
    Unreadable { path: PathBuf, source: io::Error },

    #[error("could not append to ledger file '{path}': {source}")]
    Append { path: PathBuf, source: io::Error },
}

/// Failures while loading a workflow document.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to read workflow document '{path}': {source}")]
    Read { path: PathBuf, source: io::Error },

    #[error("malformed workflow document '{path}': {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Failures while discovering or unpacking archives.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("could not list archive directory '{path}': {source}")]
    Discover { path: PathBuf, source: io::Error },

    #[error("archive '{path}' has no usable file name")]
    InvalidName { path: PathBuf },

    #[error("could not open archive '{path}': {source}")]
    Open { path: PathBuf, source: io::Error },

    #[error("could not extract archive '{path}': {source}")]
    Extract {
        path: PathBuf,
        source: zip::result::ZipError,
    },
}

/// Top-level error for a conversion run.
#[derive(Debug, Error)]
pub enum ConverterError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error("could not write generated script '{path}': {source}")]
    Output { path: PathBuf, source: io::Error },

    #[error("could not prepare directory '{path}': {source}")]
    Directory { path: PathBuf, source: io::Error },
}
