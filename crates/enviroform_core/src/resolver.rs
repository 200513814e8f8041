//! Path resolution and argument derivation.
//!
//! Turns a config directory and a primary tfvars file (both relative to the
//! repository root) into the `-backend-config` and `-var-file` arguments
//! terraform needs, validating the on-disk layout on the way.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::layout::{ConfigReference, LayoutConvention, CONFIG_MARKER};

/// Arguments derived for one deployment target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedArgs {
    /// Absolute terraform config directory; every step runs here.
    pub config_dir: PathBuf,
    /// Layout the arguments were inferred from, if a tfvars file was given.
    pub layout: Option<LayoutConvention>,
    /// `-backend-config=<backend.tfvars>`, `-backend-config=key=<state key>`
    pub backend_args: Vec<String>,
    /// environment, region and instance `-var-file=` arguments, in that order
    pub var_file_args: Vec<String>,
}

impl ResolvedArgs {
    /// A target with no tfvars file: nothing is inferred.
    pub fn config_only(config_dir: PathBuf) -> Self {
        Self {
            config_dir,
            layout: None,
            backend_args: Vec::new(),
            var_file_args: Vec::new(),
        }
    }

    pub fn state_key(&self) -> Option<String> {
        self.layout.as_ref().map(LayoutConvention::state_key)
    }
}

/// Resolves paths relative to a repository root.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve the terraform config directory, which must exist.
    pub fn resolve_config_dir(&self, config_dir_rel: &Path) -> CoreResult<PathBuf> {
        let config_dir = self.root.join(config_dir_rel);
        self.check_dir(&config_dir)?;
        Ok(config_dir)
    }

    /// Derive backend and var-file arguments for a config directory and tfvars file.
    pub fn resolve(&self, config_dir_rel: &Path, vars_file_rel: &Path) -> CoreResult<ResolvedArgs> {
        let config_dir = self.resolve_config_dir(config_dir_rel)?;
        let vars_file = self.root.join(vars_file_rel);
        self.check_file(&vars_file)?;
        self.check_file(&config_dir.join(CONFIG_MARKER))?;

        let layout = LayoutConvention::from_vars_file(&vars_file)?;
        let config = ConfigReference::from_config_dir(&config_dir)?;
        layout.validate_against(&config)?;
        debug!(
            "Inferred environment={} region={} config={}/{}",
            layout.environment, layout.region, layout.config_type, layout.config_name
        );

        let environment_tfvars = layout.environment_tfvars();
        let backend_tfvars = layout.backend_tfvars();
        let region_tfvars = layout.region_tfvars();
        self.check_file(&environment_tfvars)?;
        self.check_file(&backend_tfvars)?;
        self.check_file(&region_tfvars)?;

        let backend_args = vec![
            path_arg("-backend-config=", &backend_tfvars)?,
            format!("-backend-config=key={}", layout.state_key()),
        ];
        let var_file_args = vec![
            path_arg("-var-file=", &environment_tfvars)?,
            path_arg("-var-file=", &region_tfvars)?,
            path_arg("-var-file=", &vars_file)?,
        ];

        Ok(ResolvedArgs {
            config_dir,
            layout: Some(layout),
            backend_args,
            var_file_args,
        })
    }

    fn check_file(&self, path: &Path) -> CoreResult<()> {
        if !path.is_file() {
            return Err(CoreError::FileNotFound {
                path: path.to_path_buf(),
                root: self.root.clone(),
            });
        }
        Ok(())
    }

    fn check_dir(&self, path: &Path) -> CoreResult<()> {
        if !path.is_dir() {
            return Err(CoreError::DirNotFound {
                path: path.to_path_buf(),
                root: self.root.clone(),
            });
        }
        Ok(())
    }
}

fn path_arg(flag: &str, path: &Path) -> CoreResult<String> {
    let path = path
        .to_str()
        .ok_or_else(|| CoreError::NonUtf8Path(path.to_path_buf()))?;
    Ok(format!("{}{}", flag, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const CONFIG: &str = "terraform/apps/example-app";
    const VARS: &str = "environments/example-account/us-east-1/apps/example-app/default.tfvars";

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn layout_fixture() -> TempDir {
        let dir = tempdir().unwrap();
        let root = dir.path();
        touch(root, "terraform/apps/example-app/main.tf");
        touch(root, "terraform/infra/example-networking/main.tf");
        touch(root, "environments/example-account/environment.tfvars");
        touch(root, "environments/example-account/us-east-1/backend.tfvars");
        touch(root, "environments/example-account/us-east-1/region.tfvars");
        touch(root, VARS);
        dir
    }

    #[test]
    fn test_resolve_well_formed_layout() {
        let dir = layout_fixture();
        let root = dir.path();
        let resolver = PathResolver::new(root);

        let resolved = resolver.resolve(Path::new(CONFIG), Path::new(VARS)).unwrap();
        let region = root.join("environments/example-account/us-east-1");

        assert_eq!(resolved.config_dir, root.join(CONFIG));
        assert_eq!(
            resolved.backend_args,
            vec![
                format!("-backend-config={}", region.join("backend.tfvars").display()),
                "-backend-config=key=apps/example-app/default/state.tfstate".to_string(),
            ]
        );
        assert_eq!(
            resolved.var_file_args,
            vec![
                format!(
                    "-var-file={}",
                    root.join("environments/example-account/environment.tfvars").display()
                ),
                format!("-var-file={}", region.join("region.tfvars").display()),
                format!("-var-file={}", root.join(VARS).display()),
            ]
        );
        assert_eq!(
            resolved.state_key().as_deref(),
            Some("apps/example-app/default/state.tfstate")
        );
    }

    #[test]
    fn test_missing_config_dir() {
        let dir = layout_fixture();
        let resolver = PathResolver::new(dir.path());

        let err = resolver
            .resolve(Path::new("terraform/apps/example-foo"), Path::new(VARS))
            .unwrap_err();

        assert!(matches!(err, CoreError::DirNotFound { .. }));
        assert!(err.to_string().contains("Dir not found"));
        assert!(err.to_string().contains(&dir.path().display().to_string()));
    }

    #[test]
    fn test_missing_vars_file() {
        let dir = layout_fixture();
        let resolver = PathResolver::new(dir.path());
        let missing = "environments/example-account/us-east-1/apps/example-app/nope.tfvars";

        let err = resolver.resolve(Path::new(CONFIG), Path::new(missing)).unwrap_err();

        match err {
            CoreError::FileNotFound { path, root } => {
                assert_eq!(path, dir.path().join(missing));
                assert_eq!(root, dir.path());
            }
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_marker_file() {
        let dir = layout_fixture();
        fs::create_dir_all(dir.path().join("terraform/apps/empty-app")).unwrap();
        let resolver = PathResolver::new(dir.path());

        let err = resolver
            .resolve(Path::new("terraform/apps/empty-app"), Path::new(VARS))
            .unwrap_err();

        match err {
            CoreError::FileNotFound { path, .. } => {
                assert_eq!(path, dir.path().join("terraform/apps/empty-app/main.tf"));
            }
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_region_tfvars() {
        let dir = layout_fixture();
        fs::remove_file(dir.path().join("environments/example-account/us-east-1/region.tfvars")).unwrap();
        let resolver = PathResolver::new(dir.path());

        let err = resolver.resolve(Path::new(CONFIG), Path::new(VARS)).unwrap_err();

        assert!(err.to_string().contains("region.tfvars"));
    }

    #[test]
    fn test_config_name_mismatch() {
        let dir = layout_fixture();
        let resolver = PathResolver::new(dir.path());

        let err = resolver
            .resolve(Path::new("terraform/infra/example-networking"), Path::new(VARS))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "tfvars dir should match the config name: example-networking but is: example-app"
        );
    }

    #[test]
    fn test_config_type_mismatch() {
        let dir = layout_fixture();
        touch(dir.path(), "terraform/services/example-app/main.tf");
        let resolver = PathResolver::new(dir.path());

        let err = resolver
            .resolve(Path::new("terraform/services/example-app"), Path::new(VARS))
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "containing dir should match the config type: services but is: apps"
        );
    }

    #[test]
    fn test_config_only() {
        let resolved = ResolvedArgs::config_only(PathBuf::from("/repo/terraform/apps/example-app"));
        assert!(resolved.backend_args.is_empty());
        assert!(resolved.var_file_args.is_empty());
        assert_eq!(resolved.state_key(), None);
    }
}
