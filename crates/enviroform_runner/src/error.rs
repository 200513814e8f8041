//! Error types for the runner module.

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur during runner operations.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Command timed out after {seconds} seconds: {command}")]
    Timeout { command: String, seconds: u64 },

    #[error("Command terminated by signal: {0}")]
    Terminated(String),

    #[error("Interrupted by Ctrl-C: {0}")]
    Interrupted(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
