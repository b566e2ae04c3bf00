//! dagwright CLI Entry Point
//!
//! Converts every pending archive once and exits.
//!
//! # Usage
//!
//! ```bash
//! export OPS_JSON_PATH_IN_ZIP=/data/zip
//! export OPS_JSON_PATH_IN=/data/staging
//! export OPS_JSON_PATH_OUT=/opt/airflow/dags
//! export OPS_JSON_PROCESSED_FILE=/data/processed.txt
//! export OPS_SCRIPT_DIR=/opt/airflow/scripts
//!
//! # Convert pending archives
//! dagwright
//!
//! # Regenerate everything, ignoring the ledger
//! dagwright --force
//!
//! # Translate without writing anything
//! dagwright --dry-run --verbose
//! ```

use std::env;
use std::process::ExitCode;

use log::{error, info};

use dagwright::config::{
    ConverterConfig, ENV_ARCHIVE_DIR, ENV_LEDGER_FILE, ENV_OUTPUT_DIR, ENV_SCRIPTS_DIR,
    ENV_STAGING_DIR,
};
use dagwright::driver::Driver;
use dagwright::{APP_NAME, VERSION};

/// Command-line flags.
#[derive(Debug, Default)]
struct Flags {
    force: bool,
    dry_run: bool,
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME, VERSION);
    println!("JSON Workflow to Airflow DAG Converter");
    println!();
}

/// Usage text listing every accepted option.
fn usage() -> String {
    let env_lines = [
        (ENV_ARCHIVE_DIR, "Directory containing workflow archives (*.zip)"),
        (ENV_STAGING_DIR, "Staging directory for extraction"),
        (ENV_OUTPUT_DIR, "Output directory for generated DAGs"),
        (ENV_LEDGER_FILE, "Processing ledger file"),
        (ENV_SCRIPTS_DIR, "Destination for .py/.sh files from archives"),
    ];

    let mut text = String::from("Usage: dagwright [OPTIONS]\n\nEnvironment (all required):\n");
    for (name, meaning) in env_lines {
        text.push_str(&format!("  {:24} {}\n", name, meaning));
    }
    text.push_str("\nOptions:\n");
    text.push_str("  -f, --force         Regenerate already processed workflows\n");
    text.push_str("      --dry-run       Translate without writing output or ledger\n");
    text.push_str("  -v, --verbose       Enable debug logging\n");
    text.push_str("  -h, --help          Show this help message\n");
    text.push_str("  -V, --version       Show version information");
    text
}

/// Prints usage information.
fn print_usage() {
    println!("{}", usage());
}

/// Parses command-line arguments into flags.
fn parse_arguments(args: &[String]) -> Result<Flags, String> {
    let mut flags = Flags::default();

    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--force" | "-f" => flags.force = true,
            "--dry-run" => flags.dry_run = true,
            "--verbose" | "-v" => flags.verbose = true,
            other if other.starts_with('-') => {
                return Err(format!("Unknown option: {}", other));
            }
            other => return Err(format!("Unexpected argument: {}", other)),
        }
    }

    Ok(flags)
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let flags = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    setup_logging(flags.verbose);
    print_banner();

    let config = ConverterConfig::from_env()
        .map_err(|e| {
            error!("{}", e);
            e
        })?
        .with_force_all(flags.force)
        .with_dry_run(flags.dry_run);

    info!("Archives: {}", config.archive_dir.display());
    info!("Output:   {}", config.output_dir.display());
    info!("Ledger:   {}", config.ledger_path.display());
    if config.force_all {
        info!("Force: regenerating every workflow");
    }

    let report = Driver::new(&config).run()?;
    println!("{}", report.summary());

    if report.has_failures() {
        return Err(format!("{} archive(s) failed to convert", report.failed_count()).into());
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
