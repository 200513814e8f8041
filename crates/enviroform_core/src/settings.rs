//! Engine settings.

use serde::{Deserialize, Serialize};

use enviroform_runner::RunConfig;

/// Environment variable that overrides the engine executable.
pub const ENGINE_ENV_VAR: &str = "TERRAFORM_EXECUTABLE";
/// Executable used when no override is given, resolved via PATH.
pub const DEFAULT_ENGINE: &str = "terraform";
/// One hour: apply can be slow (database creation etc.) but not this slow.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 3600;

/// How the IaC engine is invoked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Engine executable, a bare name or a path
    pub executable: String,
    /// Per-step wait limit (0 = no timeout)
    pub timeout_seconds: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            executable: DEFAULT_ENGINE.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl EngineSettings {
    /// Defaults with the executable taken from `TERRAFORM_EXECUTABLE` if set.
    pub fn from_env() -> Self {
        Self::default().with_executable(std::env::var(ENGINE_ENV_VAR).ok())
    }

    /// Override the executable. Empty values keep the current one.
    pub fn with_executable(mut self, executable: Option<String>) -> Self {
        if let Some(executable) = executable.filter(|e| !e.trim().is_empty()) {
            self.executable = executable;
        }
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig::default().timeout(self.timeout_seconds)
    }
}
