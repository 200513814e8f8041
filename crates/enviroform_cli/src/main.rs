//! enviroform CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success, or the accepted exit code of the terraform sub-command
//! - 1: General error or failed terraform command
//! - 64: Invalid arguments
//! - 65: Layout validation failure
//!
//! The error codes stay clear of the codes terraform itself may exit with
//! successfully, such as 2 from `plan -detailed-exitcode`.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use enviroform_core::{CoreError, ErrorCategory};

mod commands;

use commands::Cli;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 64;
    pub const VALIDATION_FAILURE: u8 = 65;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here, on stdout
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(ExitCodes::INVALID_ARGS)
            } else {
                ExitCode::from(ExitCodes::SUCCESS)
            };
        }
    };

    // stdout carries the printed commands, so logs go to stderr
    let level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("enviroform={},warn", level)));
    let log_result = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    match commands::run::execute(cli).await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Map an error to its exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<CoreError>().map(CoreError::category) {
        Some(ErrorCategory::Usage) => ExitCodes::INVALID_ARGS,
        Some(ErrorCategory::Layout) => ExitCodes::VALIDATION_FAILURE,
        Some(ErrorCategory::Execution) | None => ExitCodes::GENERAL_ERROR,
    }
}
