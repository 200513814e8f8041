//! The wrapper: from command-line inputs to an executed plan.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use enviroform_runner::CommandRunner;

use crate::error::{CoreError, CoreResult};
use crate::executor::{PlanExecutor, PlanOutcome};
use crate::plan::CommandPlan;
use crate::resolver::{PathResolver, ResolvedArgs};
use crate::settings::EngineSettings;
use crate::subcommand::Subcommand;

/// One wrapper invocation, as given by the user.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Terraform config directory, relative to the root
    pub config_dir: PathBuf,
    /// Primary tfvars file, relative to the root
    pub vars_file: Option<PathBuf>,
    /// Print commands instead of running them
    pub dry_run: bool,
    /// Terraform sub-command followed by its own arguments
    pub command: Vec<String>,
}

impl Invocation {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            ..Self::default()
        }
    }

    pub fn vars_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.vars_file = Some(path.into());
        self
    }

    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.command = command.into_iter().map(Into::into).collect();
        self
    }
}

/// Infers arguments for an invocation and runs the resulting plan.
pub struct Enviroform {
    settings: EngineSettings,
    resolver: PathResolver,
}

impl Enviroform {
    pub fn new(settings: EngineSettings, root: impl Into<PathBuf>) -> Self {
        Self {
            settings,
            resolver: PathResolver::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        self.resolver.root()
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Validate the invocation and the on-disk layout, and build the plan.
    pub fn plan(&self, invocation: &Invocation) -> CoreResult<CommandPlan> {
        let (name, user_args) = invocation
            .command
            .split_first()
            .ok_or(CoreError::MissingSubcommand)?;
        let subcommand = Subcommand::parse(name);

        let resolved = match &invocation.vars_file {
            Some(vars_file) => self.resolver.resolve(&invocation.config_dir, vars_file)?,
            None if subcommand.requires_vars_file() => {
                return Err(CoreError::MissingArgument("--tfvars-file-path"));
            }
            None => {
                warn!("No tfvars file given: init runs without inferred backend configuration");
                ResolvedArgs::config_only(self.resolver.resolve_config_dir(&invocation.config_dir)?)
            }
        };

        if let Some(key) = resolved.state_key() {
            info!("Using state key {}", key);
        }

        let policy = subcommand.policy();
        let vars_unused = !policy.stops_after_init && !policy.include_var_files;
        let unused_vars_file = invocation.vars_file.as_ref().filter(|_| vars_unused);

        let mut plan = CommandPlan::build(&self.settings.executable, subcommand, user_args, &resolved);
        if let Some(vars_file) = unused_vars_file {
            // still feeds the backend config of the init step
            let message = format!(
                "--tfvars-file-path {} only sets the init backend; terraform {} gets no -var-file arguments",
                vars_file.display(),
                plan.subcommand
            );
            warn!("{}", message);
            plan.warnings.push(message);
        }

        Ok(plan)
    }

    /// Build the plan and execute it with `runner`.
    pub async fn run(
        &self,
        invocation: &Invocation,
        runner: Arc<dyn CommandRunner>,
    ) -> CoreResult<PlanOutcome> {
        let plan = self.plan(invocation)?;
        PlanExecutor::new(runner)
            .with_run_config(self.settings.run_config())
            .dry_run(invocation.dry_run)
            .execute(&plan)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enviroform_runner::MockRunner;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_missing_subcommand_is_usage_error() {
        let wrapper = Enviroform::new(EngineSettings::default(), "/nonexistent");
        let err = wrapper.plan(&Invocation::new("terraform/apps/example-app")).unwrap_err();

        assert!(matches!(err, CoreError::MissingSubcommand));
    }

    #[test]
    fn test_recognized_subcommand_needs_vars_file() {
        let wrapper = Enviroform::new(EngineSettings::default(), "/nonexistent");
        let invocation = Invocation::new("terraform/apps/example-app").command(["apply"]);

        let err = wrapper.plan(&invocation).unwrap_err();

        assert!(matches!(err, CoreError::MissingArgument("--tfvars-file-path")));
    }

    #[tokio::test]
    async fn test_pass_through_without_vars_file() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("terraform/apps/example-app")).unwrap();
        let wrapper = Enviroform::new(
            EngineSettings::default().with_executable(Some("tofu".to_string())),
            dir.path(),
        );
        let invocation = Invocation::new("terraform/apps/example-app").command(["state", "list"]);
        let mock = MockRunner::new();

        let outcome = wrapper.run(&invocation, Arc::new(mock.clone())).await.unwrap();

        assert_eq!(outcome, PlanOutcome::Completed { exit_code: 0 });
        let calls = mock.get_calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].argv(), vec!["tofu", "init"]);
        assert_eq!(calls[2].argv(), vec!["tofu", "state", "list"]);
        assert_eq!(calls[2].timeout_seconds, 3600);
    }

    #[test]
    fn test_unused_vars_file_is_warned_about() {
        let dir = tempdir().unwrap();
        let vars = "environments/example-account/us-east-1/apps/example-app/default.tfvars";
        for file in [
            "terraform/apps/example-app/main.tf",
            "environments/example-account/environment.tfvars",
            "environments/example-account/us-east-1/backend.tfvars",
            "environments/example-account/us-east-1/region.tfvars",
            vars,
        ] {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }
        let wrapper = Enviroform::new(EngineSettings::default(), dir.path());

        let output = Invocation::new("terraform/apps/example-app")
            .vars_file(vars)
            .command(["output"]);
        let plan = wrapper.plan(&output).unwrap();

        assert_eq!(plan.warnings.len(), 2);
        assert!(plan.warnings[1].contains("default.tfvars"));
        assert!(plan.warnings[1].contains("terraform output gets no -var-file arguments"));
        // the backend is still inferred from it
        let init = plan.step(crate::plan::StepKind::Init).unwrap();
        assert_eq!(init.command.args.len(), 3);

        for command in ["init", "apply"] {
            let invocation = Invocation::new("terraform/apps/example-app")
                .vars_file(vars)
                .command([command]);
            assert!(wrapper.plan(&invocation).unwrap().warnings.is_empty());
        }
    }

    #[test]
    fn test_pass_through_checks_config_dir() {
        let dir = tempdir().unwrap();
        let wrapper = Enviroform::new(EngineSettings::default(), dir.path());
        let invocation = Invocation::new("terraform/apps/missing").command(["output"]);

        let err = wrapper.plan(&invocation).unwrap_err();

        assert!(matches!(err, CoreError::DirNotFound { .. }));
    }
}
