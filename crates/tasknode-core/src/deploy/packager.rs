use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::archive::write_zip_archive;
use super::environment::{filter_requirements, EnvironmentProbe, OsKind};
use super::snapshot::snapshot_directory;
use super::{
    ExclusionRules, ARCHIVE_NAME, PRODUCT_NAME, REQUIREMENTS_FILE, RUN_INFO_FILE,
    STAGING_DIR_NAME,
};
use crate::error::{Error, Result};

/// Run metadata read by the backend to reproduce the environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunInfo {
    pub python_version: String,
    pub os_info: OsKind,
    pub script: String,
}

/// Staging directory and archive of one submit. Both are removed on drop.
#[derive(Debug)]
pub struct DeployPackage {
    staging_dir: PathBuf,
    archive_path: PathBuf,
}

impl DeployPackage {
    fn new(working_dir: &Path) -> Self {
        Self {
            staging_dir: working_dir.join(STAGING_DIR_NAME),
            archive_path: working_dir.join(ARCHIVE_NAME),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    fn remove_artifacts(&self) {
        if self.staging_dir.exists() {
            if let Err(e) = fs::remove_dir_all(&self.staging_dir) {
                warn!(error = %e, path = %self.staging_dir.display(), "Failed to remove staging directory");
            }
        }
        if self.archive_path.exists() {
            if let Err(e) = fs::remove_file(&self.archive_path) {
                warn!(error = %e, path = %self.archive_path.display(), "Failed to remove archive");
            }
        }
    }
}

impl Drop for DeployPackage {
    fn drop(&mut self) {
        debug!("Cleaning up deploy artifacts");
        self.remove_artifacts();
    }
}

pub struct DeployPackager<P> {
    probe: P,
    rules: ExclusionRules,
}

impl<P: EnvironmentProbe> DeployPackager<P> {
    pub fn new(probe: P) -> Self {
        Self {
            probe,
            rules: ExclusionRules::default(),
        }
    }

    /// Resolve `script` against `working_dir` and return the relative path
    /// recorded in the run metadata.
    pub fn validate_script(&self, working_dir: &Path, script: &str) -> Result<String> {
        let not_found = || Error::ScriptNotFound(script.to_string());

        let path = Path::new(script);
        let relative = if path.is_absolute() {
            path.strip_prefix(working_dir).map_err(|_| not_found())?
        } else {
            path
        };
        if relative.components().any(|c| matches!(c, Component::ParentDir)) {
            return Err(not_found());
        }
        if !working_dir.join(relative).is_file() {
            return Err(not_found());
        }
        Ok(relative
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"))
    }

    /// Stage and compress `working_dir`.
    ///
    /// Fails with `ScriptNotFound` before touching the filesystem when the
    /// entry script is missing. Partial output is removed on failure.
    pub fn build(&self, working_dir: &Path, script: &str) -> Result<DeployPackage> {
        let script = self.validate_script(working_dir, script)?;

        let package = DeployPackage::new(working_dir);
        package.remove_artifacts();

        self.stage(working_dir, &package, script)
            .map_err(Error::Package)?;

        let size = write_zip_archive(&package.staging_dir, STAGING_DIR_NAME, &package.archive_path)
            .map_err(Error::Package)?;
        info!(bytes = size, "Deploy package built");
        Ok(package)
    }

    fn stage(&self, working_dir: &Path, package: &DeployPackage, script: String) -> anyhow::Result<()> {
        let files = snapshot_directory(working_dir, &package.staging_dir, &self.rules)?;
        debug!(files, "Copied project files");

        let freeze = self
            .probe
            .installed_packages()
            .context("Failed to list installed packages")?;
        let requirements = filter_requirements(&freeze, PRODUCT_NAME);
        fs::write(package.staging_dir.join(REQUIREMENTS_FILE), requirements)
            .context("Failed to write dependency manifest")?;

        let run_info = RunInfo {
            python_version: self
                .probe
                .python_version()
                .context("Failed to determine Python version")?,
            os_info: self.probe.os_kind(),
            script,
        };
        debug!(?run_info, "Recording run metadata");
        fs::write(
            package.staging_dir.join(RUN_INFO_FILE),
            serde_json::to_string(&run_info)?,
        )
        .context("Failed to write run metadata")?;
        Ok(())
    }
}
