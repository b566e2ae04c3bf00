//! Converter Configuration
//!
//! All locations the converter touches are collected once at startup into
//! a [`ConverterConfig`] and handed to every component by reference.
//!
//! # Environment
//!
//! | Variable                  | Meaning                          |
//! |---------------------------|----------------------------------|
//! | `OPS_JSON_PATH_IN_ZIP`    | directory scanned for `*.zip`    |
//! | `OPS_JSON_PATH_IN`        | staging directory for extraction |
//! | `OPS_JSON_PATH_OUT`       | where generated DAGs are written |
//! | `OPS_JSON_PROCESSED_FILE` | processing ledger file           |
//! | `OPS_SCRIPT_DIR`          | destination for `.py`/`.sh` files |

use std::path::PathBuf;

use log::debug;

use crate::error::ConfigError;

pub const ENV_ARCHIVE_DIR: &str = "OPS_JSON_PATH_IN_ZIP";
pub const ENV_STAGING_DIR: &str = "OPS_JSON_PATH_IN";
pub const ENV_OUTPUT_DIR: &str = "OPS_JSON_PATH_OUT";
pub const ENV_LEDGER_FILE: &str = "OPS_JSON_PROCESSED_FILE";
pub const ENV_SCRIPTS_DIR: &str = "OPS_SCRIPT_DIR";

/// Resolved configuration for one converter run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterConfig {
    /// Directory where input archives are discovered
    pub archive_dir: PathBuf,

    /// Extraction target; each archive gets its own subdirectory
    pub staging_dir: PathBuf,

    /// Directory receiving `<id>_dag.py` files
    pub output_dir: PathBuf,

    /// Processing ledger location
    pub ledger_path: PathBuf,

    /// Destination for auxiliary scripts shipped inside archives
    pub scripts_dir: PathBuf,

    /// Regenerate every workflow, as if each archive carried `force.flag`
    pub force_all: bool,

    /// Translate without writing output, touching the ledger or moving scripts
    pub dry_run: bool,
}

impl ConverterConfig {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// Every variable is required; empty values are treated as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &'static str| -> Result<PathBuf, ConfigError> {
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => {
                    debug!("{} = {}", name, value);
                    Ok(PathBuf::from(value))
                }
                _ => Err(ConfigError::Missing(name)),
            }
        };

        Ok(Self {
            archive_dir: require(ENV_ARCHIVE_DIR)?,
            staging_dir: require(ENV_STAGING_DIR)?,
            output_dir: require(ENV_OUTPUT_DIR)?,
            ledger_path: require(ENV_LEDGER_FILE)?,
            scripts_dir: require(ENV_SCRIPTS_DIR)?,
            force_all: false,
            dry_run: false,
        })
    }

    /// Forces regeneration of every workflow in the batch.
    pub fn with_force_all(mut self, force_all: bool) -> Self {
        self.force_all = force_all;
        self
    }

    /// Enables or disables dry run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}
