//! CLI argument definitions.
//!
//! enviroform has a single command line: wrapper options first, then the
//! terraform sub-command and its own flags, which are passed through as-is.

use std::path::PathBuf;

use clap::Parser;

use enviroform_core::settings::DEFAULT_TIMEOUT_SECONDS;

pub mod run;

/// enviroform - terraform with backend and tfvars inferred from the repo layout
#[derive(Parser, Debug)]
#[command(name = "enviroform")]
#[command(version, about = "enviroform - terraform with backend and tfvars inferred from the repo layout")]
#[command(long_about = r#"
enviroform runs terraform against a config directory, inferring the backend
configuration, the state key and the tfvars files from where the primary
tfvars file sits in the environments tree.

Every run removes the local .terraform cache, runs `terraform init` with the
inferred backend, then runs the requested sub-command. Wrapper options must
come before the sub-command; everything after it is passed to terraform.

EXAMPLE:
  enviroform -t terraform/apps/example-app \
    -z environments/example-account/us-east-1/apps/example-app/default.tfvars \
    plan -out=plan.out

EXIT CODES:
  0 - Success (or the sub-command's accepted code, e.g. 2 from plan with changes)
  1 - General error or failed terraform command
  64 - Invalid arguments
  65 - Layout validation failure
"#)]
pub struct Cli {
    /// Terraform config directory, relative to the repository root
    #[arg(short = 't', long, value_name = "PATH")]
    pub terraform_config_path: PathBuf,

    /// Primary tfvars file, relative to the repository root
    #[arg(short = 'z', long, value_name = "PATH")]
    pub tfvars_file_path: Option<PathBuf>,

    /// Print the commands without running them
    #[arg(short, long)]
    pub dry_run: bool,

    /// Terraform executable (defaults to $TERRAFORM_EXECUTABLE, then `terraform`)
    #[arg(long, value_name = "EXECUTABLE")]
    pub terraform_executable: Option<String>,

    /// Per-command timeout in seconds (0 = no timeout)
    #[arg(long, env = "ENVIROFORM_TIMEOUT_SECONDS", default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    /// Repository root (defaults to the git top-level of the current directory)
    #[arg(long, env = "ENVIROFORM_ROOT", value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Print the command plan as JSON and exit without running anything
    #[arg(long)]
    pub plan_json: bool,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Terraform sub-command followed by its own arguments
    #[arg(
        value_name = "COMMAND",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_trailing_args_pass_through() {
        let cli = Cli::try_parse_from([
            "enviroform",
            "-t",
            "terraform/apps/example-app",
            "-z",
            "environments/a/r/apps/example-app/default.tfvars",
            "-d",
            "plan",
            "-out=plan.out",
            "-d",
        ])
        .unwrap();

        assert!(cli.dry_run);
        assert_eq!(cli.terraform_config_path, PathBuf::from("terraform/apps/example-app"));
        assert_eq!(cli.command, vec!["plan", "-out=plan.out", "-d"]);
    }

    #[test]
    fn test_config_path_is_required() {
        let err = Cli::try_parse_from(["enviroform", "apply"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["enviroform", "-t", "terraform/apps/x"]).unwrap();

        assert!(!cli.dry_run);
        assert!(!cli.plan_json);
        assert!(cli.tfvars_file_path.is_none());
        assert!(cli.command.is_empty());
    }
}
