//! Terraform sub-commands and how each one is treated.

use std::fmt;

use serde::{Serialize, Serializer};

/// Flag appended to `plan` so that "changes present" exits with 2.
pub const DETAILED_EXITCODE: &str = "-detailed-exitcode";

/// A terraform sub-command as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subcommand {
    Init,
    Plan,
    Apply,
    Refresh,
    Destroy,
    Import,
    /// Anything else, passed through untouched.
    Other(String),
}

/// What the wrapper adds to a sub-command's main step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubcommandPolicy {
    /// Stop after `init`, with the user's arguments appended to it.
    pub stops_after_init: bool,
    /// Prepend the inferred `-var-file` arguments.
    pub include_var_files: bool,
    /// Flags appended after the user's arguments.
    pub extra_args: &'static [&'static str],
    /// Exit codes that count as success.
    pub accepted_exit_codes: &'static [i32],
}

impl SubcommandPolicy {
    const INIT: Self = Self {
        stops_after_init: true,
        include_var_files: false,
        extra_args: &[],
        accepted_exit_codes: &[0],
    };

    const VAR_FILES: Self = Self {
        stops_after_init: false,
        include_var_files: true,
        extra_args: &[],
        accepted_exit_codes: &[0],
    };

    // 0 means no diff, 2 means diff
    const PLAN: Self = Self {
        stops_after_init: false,
        include_var_files: true,
        extra_args: &[DETAILED_EXITCODE],
        accepted_exit_codes: &[0, 2],
    };

    const PASS_THROUGH: Self = Self {
        stops_after_init: false,
        include_var_files: false,
        extra_args: &[],
        accepted_exit_codes: &[0],
    };
}

impl Subcommand {
    pub fn parse(name: &str) -> Self {
        match name {
            "init" => Self::Init,
            "plan" => Self::Plan,
            "apply" => Self::Apply,
            "refresh" => Self::Refresh,
            "destroy" => Self::Destroy,
            "import" => Self::Import,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Init => "init",
            Self::Plan => "plan",
            Self::Apply => "apply",
            Self::Refresh => "refresh",
            Self::Destroy => "destroy",
            Self::Import => "import",
            Self::Other(name) => name,
        }
    }

    pub fn policy(&self) -> SubcommandPolicy {
        match self {
            Self::Init => SubcommandPolicy::INIT,
            Self::Plan => SubcommandPolicy::PLAN,
            Self::Apply | Self::Refresh | Self::Destroy | Self::Import => SubcommandPolicy::VAR_FILES,
            Self::Other(_) => SubcommandPolicy::PASS_THROUGH,
        }
    }

    /// Whether the wrapper infers anything for this sub-command.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    /// Whether a tfvars file must be supplied.
    pub fn requires_vars_file(&self) -> bool {
        self.is_recognized()
    }
}

impl Serialize for Subcommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
