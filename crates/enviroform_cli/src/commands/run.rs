//! Run command - infer arguments, then plan and execute terraform.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use enviroform_core::{EngineSettings, Enviroform, GitOps, Invocation, PlanOutcome};
use enviroform_runner::{CommandRunner, ProcessRunner};

use super::Cli;
use crate::ExitCodes;

pub async fn execute(cli: Cli) -> Result<u8> {
    let root = match cli.root {
        Some(root) => root,
        None => discover_root()?,
    };
    let settings = EngineSettings::from_env()
        .with_executable(cli.terraform_executable)
        .with_timeout(cli.timeout_seconds);
    debug!(
        "Root {}, engine {}, timeout {}s",
        root.display(),
        settings.executable,
        settings.timeout_seconds
    );

    let wrapper = Enviroform::new(settings, root);
    let invocation = Invocation {
        config_dir: cli.terraform_config_path,
        vars_file: cli.tfvars_file_path,
        dry_run: cli.dry_run,
        command: cli.command,
    };

    if cli.plan_json {
        let plan = wrapper.plan(&invocation)?;
        println!("{}", plan.to_json()?);
        return Ok(ExitCodes::SUCCESS);
    }

    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::default());
    let exit_code = match wrapper.run(&invocation, runner).await? {
        PlanOutcome::StoppedAfterInit => ExitCodes::SUCCESS,
        PlanOutcome::Completed { exit_code } => {
            u8::try_from(exit_code).unwrap_or(ExitCodes::GENERAL_ERROR)
        }
    };

    Ok(exit_code)
}

/// Relative paths are resolved against the top level of the current repo.
fn discover_root() -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let hint = if GitOps::is_git_available() {
        "run enviroform inside a git repository or pass --root"
    } else {
        "git is not installed; pass --root"
    };
    let root = GitOps::new(&cwd).toplevel().context(hint)?;
    Ok(root)
}
