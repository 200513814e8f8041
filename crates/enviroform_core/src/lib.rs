//! # enviroform_core
//!
//! Layout inference and command planning for enviroform, a terraform wrapper.
//!
//! Given a terraform config directory and one primary `.tfvars` file laid
//! out by convention, the wrapper infers the environment, region and
//! backend tfvars files, derives a remote state key, and runs
//! `terraform init` followed by the requested sub-command.
//!
//! ## Layout
//!
//! ```text
//! <base>/<environment>/environment.tfvars
//! <base>/<environment>/<region>/backend.tfvars
//! <base>/<environment>/<region>/region.tfvars
//! <base>/<environment>/<region>/<config_type>/<config_name>/<instance>.tfvars
//! <config_root>/<config_type>/<config_name>/main.tf
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use enviroform_core::{EngineSettings, Enviroform, Invocation};
//! use enviroform_runner::ProcessRunner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let wrapper = Enviroform::new(EngineSettings::from_env(), "/path/to/repo");
//! let invocation = Invocation::new("terraform/apps/example-app")
//!     .vars_file("environments/example-account/us-east-1/apps/example-app/default.tfvars")
//!     .command(["plan"]);
//!
//! let outcome = wrapper.run(&invocation, Arc::new(ProcessRunner::default())).await?;
//! println!("exit code {}", outcome.exit_code());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod git;
pub mod layout;
pub mod plan;
pub mod resolver;
pub mod settings;
pub mod subcommand;
pub mod wrapper;

pub use error::{CoreError, CoreResult, ErrorCategory};
pub use executor::{PlanExecutor, PlanOutcome, STOPPED_AFTER_INIT};
pub use git::GitOps;
pub use layout::{ConfigReference, LayoutConvention};
pub use plan::{CommandPlan, PlanStep, StepKind};
pub use resolver::{PathResolver, ResolvedArgs};
pub use settings::EngineSettings;
pub use subcommand::{Subcommand, SubcommandPolicy};
pub use wrapper::{Enviroform, Invocation};
