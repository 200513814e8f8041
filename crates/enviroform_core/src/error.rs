//! Error types for the core module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while resolving a layout or running a plan.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("You must provide a terraform command e.g. apply")]
    MissingSubcommand,

    #[error("Missing required argument: {0}")]
    MissingArgument(&'static str),

    #[error("File not found at: {}. Your root is {}", .path.display(), .root.display())]
    FileNotFound { path: PathBuf, root: PathBuf },

    #[error("Dir not found at: {}. Your root is {}", .path.display(), .root.display())]
    DirNotFound { path: PathBuf, root: PathBuf },

    #[error(
        "Path too shallow: {} has {found} trailing segments, expected at least {required}",
        .path.display()
    )]
    PathTooShallow {
        path: PathBuf,
        found: usize,
        required: usize,
    },

    #[error("tfvars dir should match the config name: {expected} but is: {actual}")]
    ConfigNameMismatch { expected: String, actual: String },

    #[error("containing dir should match the config type: {expected} but is: {actual}")]
    ConfigTypeMismatch { expected: String, actual: String },

    #[error("Path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("Command failed with exit code {exit_code}: {command}")]
    CommandFailed { command: String, exit_code: i32 },

    #[error("Repository root discovery failed: {0}")]
    RootDiscovery(String),

    #[error("Runner error: {0}")]
    Runner(#[from] enviroform_runner::RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Broad classes of failure, used to pick a process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Usage,
    Layout,
    Execution,
}

impl CoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingSubcommand | Self::MissingArgument(_) => ErrorCategory::Usage,
            Self::FileNotFound { .. }
            | Self::DirNotFound { .. }
            | Self::PathTooShallow { .. }
            | Self::ConfigNameMismatch { .. }
            | Self::ConfigTypeMismatch { .. }
            | Self::NonUtf8Path(_) => ErrorCategory::Layout,
            Self::CommandFailed { .. }
            | Self::RootDiscovery(_)
            | Self::Runner(_)
            | Self::Io(_)
            | Self::Serialization(_) => ErrorCategory::Execution,
        }
    }
}
