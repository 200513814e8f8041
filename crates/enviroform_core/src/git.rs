//! Repository root discovery.
//!
//! Relative config and tfvars paths are resolved against the top level of
//! the git repository the wrapper is run from.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Git queries for a working directory.
#[derive(Debug)]
pub struct GitOps {
    repo_path: PathBuf,
}

impl GitOps {
    /// Create a new Git operations manager for a directory inside a repository.
    pub fn new<P: AsRef<Path>>(repo_path: P) -> Self {
        Self {
            repo_path: repo_path.as_ref().to_path_buf(),
        }
    }

    /// Check if Git is available on the system.
    pub fn is_git_available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    /// Absolute path of the repository's top-level directory.
    pub fn toplevel(&self) -> CoreResult<PathBuf> {
        let output = Command::new("git")
            .args(["rev-parse", "--show-toplevel"])
            .current_dir(&self.repo_path)
            .output()
            .map_err(|e| CoreError::RootDiscovery(format!("Failed to run git: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::RootDiscovery(format!(
                "git rev-parse failed in {}: {}",
                self.repo_path.display(),
                stderr.trim()
            )));
        }

        let root = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        if root.is_empty() {
            return Err(CoreError::RootDiscovery("git returned an empty top-level".to_string()));
        }
        debug!("Repository root: {}", root);

        Ok(PathBuf::from(root))
    }
}
