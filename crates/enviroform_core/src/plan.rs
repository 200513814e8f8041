//! Command plan construction.
//!
//! Every run is: remove the local `.terraform` cache, `terraform init` with
//! the inferred backend, then the requested sub-command. `init` itself stops
//! after the second step.

use serde::Serialize;
use tracing::warn;

use enviroform_runner::CommandSpec;

use crate::error::CoreResult;
use crate::resolver::ResolvedArgs;
use crate::subcommand::Subcommand;

/// Terraform's local working cache inside a config directory.
pub const CACHE_DIR: &str = ".terraform";

/// Role of a step within a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Cleanup,
    Init,
    Main,
}

/// One command to run and the exit codes that count as success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanStep {
    pub kind: StepKind,
    pub command: CommandSpec,
    pub accepted_exit_codes: Vec<i32>,
}

impl PlanStep {
    fn new(kind: StepKind, command: CommandSpec) -> Self {
        Self {
            kind,
            command,
            accepted_exit_codes: vec![0],
        }
    }

    fn accepting(mut self, codes: &[i32]) -> Self {
        self.accepted_exit_codes = codes.to_vec();
        self
    }

    pub fn accepts(&self, exit_code: i32) -> bool {
        self.accepted_exit_codes.contains(&exit_code)
    }
}

/// Ordered commands for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandPlan {
    pub subcommand: Subcommand,
    pub steps: Vec<PlanStep>,
    /// Set for `init`: the run ends, successfully, after the init step.
    pub stops_after_init: bool,
    pub warnings: Vec<String>,
}

impl CommandPlan {
    /// Build the plan for `subcommand` with the user's trailing arguments.
    pub fn build(
        engine: &str,
        subcommand: Subcommand,
        user_args: &[String],
        resolved: &ResolvedArgs,
    ) -> Self {
        let policy = subcommand.policy();
        let mut warnings = Vec::new();

        let cleanup = CommandSpec::new("rm")
            .args(["-rf", CACHE_DIR])
            .working_dir(&resolved.config_dir);

        let mut init = CommandSpec::new(engine)
            .arg("init")
            .args(resolved.backend_args.iter().cloned())
            .working_dir(&resolved.config_dir);

        if policy.stops_after_init {
            // the user's own init flags
            init = init.args(user_args.iter().cloned());
            return Self {
                subcommand,
                steps: vec![
                    PlanStep::new(StepKind::Cleanup, cleanup),
                    PlanStep::new(StepKind::Init, init),
                ],
                stops_after_init: true,
                warnings,
            };
        }

        let mut main = CommandSpec::new(engine)
            .arg(subcommand.name())
            .working_dir(&resolved.config_dir);
        if policy.include_var_files {
            main = main.args(resolved.var_file_args.iter().cloned());
        } else {
            let shown: Vec<&str> = std::iter::once(subcommand.name())
                .chain(user_args.iter().map(String::as_str))
                .collect();
            let message = format!(
                "terraform {} will be run as provided after init. \
                 It has no special processing of tfvars files. You must provide all args and flags.",
                shown.join(" ")
            );
            warn!("{}", message);
            warnings.push(message);
        }
        main = main
            .args(user_args.iter().cloned())
            .args(policy.extra_args.iter().copied());

        Self {
            subcommand,
            steps: vec![
                PlanStep::new(StepKind::Cleanup, cleanup),
                PlanStep::new(StepKind::Init, init),
                PlanStep::new(StepKind::Main, main).accepting(policy.accepted_exit_codes),
            ],
            stops_after_init: false,
            warnings,
        }
    }

    pub fn step(&self, kind: StepKind) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
