//! Directory layout convention.
//!
//! A primary tfvars file lives at
//! `<base>/<environment>/<region>/<config_type>/<config_name>/<instance>.tfvars`
//! and the terraform config it deploys lives at
//! `<config_root>/<config_type>/<config_name>/`. Everything else the wrapper
//! needs is inferred from those two paths.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::error::{CoreError, CoreResult};

/// Variables shared by every deployment in an environment.
pub const ENVIRONMENT_TFVARS: &str = "environment.tfvars";
/// Backend (remote state) settings for a region.
pub const BACKEND_TFVARS: &str = "backend.tfvars";
/// Variables shared by every deployment in a region.
pub const REGION_TFVARS: &str = "region.tfvars";
/// File that must exist in a terraform config directory.
pub const CONFIG_MARKER: &str = "main.tf";
/// Final segment of every remote state key.
pub const STATE_FILE: &str = "state.tfstate";

const VARS_FILE_SEGMENTS: usize = 5;
const CONFIG_DIR_SEGMENTS: usize = 2;

/// Positional decomposition of a primary tfvars file path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutConvention {
    pub environments_base: PathBuf,
    pub environment: String,
    pub region: String,
    pub config_type: String,
    pub config_name: String,
    pub filename: String,
}

impl LayoutConvention {
    /// Decompose a tfvars file path. Needs five trailing segments.
    pub fn from_vars_file(path: &Path) -> CoreResult<Self> {
        let (environments_base, [environment, region, config_type, config_name, filename]) =
            split_trailing::<VARS_FILE_SEGMENTS>(path)?;

        Ok(Self {
            environments_base,
            environment,
            region,
            config_type,
            config_name,
            filename,
        })
    }

    pub fn environment_dir(&self) -> PathBuf {
        self.environments_base.join(&self.environment)
    }

    pub fn region_dir(&self) -> PathBuf {
        self.environment_dir().join(&self.region)
    }

    pub fn environment_tfvars(&self) -> PathBuf {
        self.environment_dir().join(ENVIRONMENT_TFVARS)
    }

    pub fn backend_tfvars(&self) -> PathBuf {
        self.region_dir().join(BACKEND_TFVARS)
    }

    pub fn region_tfvars(&self) -> PathBuf {
        self.region_dir().join(REGION_TFVARS)
    }

    /// Filename without its final extension.
    pub fn instance_label(&self) -> String {
        Path::new(&self.filename)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.filename.clone())
    }

    /// Remote state key. Always `/`-joined: it names an object in remote storage.
    pub fn state_key(&self) -> String {
        [
            self.config_type.as_str(),
            self.config_name.as_str(),
            self.instance_label().as_str(),
            STATE_FILE,
        ]
        .join("/")
    }

    /// Check that this layout targets the given config directory.
    pub fn validate_against(&self, config: &ConfigReference) -> CoreResult<()> {
        if self.config_name != config.config_name {
            return Err(CoreError::ConfigNameMismatch {
                expected: config.config_name.clone(),
                actual: self.config_name.clone(),
            });
        }
        if self.config_type != config.config_type {
            return Err(CoreError::ConfigTypeMismatch {
                expected: config.config_type.clone(),
                actual: self.config_type.clone(),
            });
        }
        Ok(())
    }
}

/// The last two segments of a terraform config directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigReference {
    pub config_type: String,
    pub config_name: String,
}

impl ConfigReference {
    pub fn from_config_dir(path: &Path) -> CoreResult<Self> {
        let (_, [config_type, config_name]) = split_trailing::<CONFIG_DIR_SEGMENTS>(path)?;

        Ok(Self {
            config_type,
            config_name,
        })
    }
}

/// Split `path` into a prefix and its last `N` normal segments.
///
/// Root, prefix, `.` and `..` components never count as segments.
fn split_trailing<const N: usize>(path: &Path) -> CoreResult<(PathBuf, [String; N])> {
    let components: Vec<Component<'_>> = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();

    let found = components
        .iter()
        .rev()
        .take_while(|c| matches!(c, Component::Normal(_)))
        .count();
    if found < N {
        return Err(CoreError::PathTooShallow {
            path: path.to_path_buf(),
            found,
            required: N,
        });
    }

    let (prefix, tail) = components.split_at(components.len() - N);
    let mut segments: [String; N] = std::array::from_fn(|_| String::new());
    for (segment, component) in segments.iter_mut().zip(tail) {
        *segment = component
            .as_os_str()
            .to_str()
            .ok_or_else(|| CoreError::NonUtf8Path(path.to_path_buf()))?
            .to_owned();
    }

    Ok((prefix.iter().collect(), segments))
}
