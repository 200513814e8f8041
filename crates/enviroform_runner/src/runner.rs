//! Command runner trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{CommandSpec, RunConfig};
use crate::error::RunnerResult;

/// Result of a command execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The command that was run, as printed
    pub command: String,
    /// Exit code reported by the child
    pub exit_code: i32,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Command runner trait.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and report its exit code.
    async fn run(&self, spec: &CommandSpec, run_config: &RunConfig) -> RunnerResult<ExecutionResult>;
}
