//! Plan execution.

use std::sync::Arc;

use tracing::{error, info};

use enviroform_runner::{CommandRunner, RunConfig};

use crate::error::{CoreError, CoreResult};
use crate::plan::CommandPlan;

/// Message shown when a plan ends after `init` by request.
pub const STOPPED_AFTER_INIT: &str = "You specified init, so we will stop here.";

/// How a plan that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOutcome {
    /// Every step ran; `exit_code` is the main step's (accepted) code.
    Completed { exit_code: i32 },
    /// The user asked for `init`; nothing after it was run.
    StoppedAfterInit,
}

impl PlanOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Completed { exit_code } => *exit_code,
            Self::StoppedAfterInit => 0,
        }
    }
}

/// Runs plan steps in order, stopping at the first unaccepted exit code.
pub struct PlanExecutor {
    runner: Arc<dyn CommandRunner>,
    run_config: RunConfig,
    dry_run: bool,
}

impl PlanExecutor {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            run_config: RunConfig::default(),
            dry_run: false,
        }
    }

    pub fn with_run_config(mut self, run_config: RunConfig) -> Self {
        self.run_config = run_config;
        self
    }

    /// Print commands without running them.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub async fn execute(&self, plan: &CommandPlan) -> CoreResult<PlanOutcome> {
        if self.dry_run {
            println!("\n==== Executing in --dry-run mode ===\n");
        }

        let mut exit_code = 0;
        for step in &plan.steps {
            println!("{}", step.command);

            exit_code = if self.dry_run {
                println!();
                0
            } else {
                self.runner.run(&step.command, &self.run_config).await?.exit_code
            };

            if !step.accepts(exit_code) {
                error!("Command failed with exit code {}: {}", exit_code, step.command);
                return Err(CoreError::CommandFailed {
                    command: step.command.to_string(),
                    exit_code,
                });
            }
        }

        if plan.stops_after_init {
            info!("{}", STOPPED_AFTER_INIT);
            return Ok(PlanOutcome::StoppedAfterInit);
        }

        Ok(PlanOutcome::Completed { exit_code })
    }
}
