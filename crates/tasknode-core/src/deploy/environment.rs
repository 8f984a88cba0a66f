//! Probes of the local Python environment recorded in a deploy package.

use std::process::{Command, Output};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;

/// Host operating system as reported to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OsKind {
    Windows,
    Mac,
    Linux,
}

impl OsKind {
    /// Windows hosts are identified directly; anything else is classified
    /// from the output of `uname`.
    pub fn classify(is_windows: bool, uname: &str) -> Self {
        if is_windows {
            OsKind::Windows
        } else if uname.contains("Darwin") {
            OsKind::Mac
        } else {
            OsKind::Linux
        }
    }
}

/// Source of the environment facts written into a deploy package.
pub trait EnvironmentProbe {
    /// Raw `pip freeze` style listing of installed packages.
    fn installed_packages(&self) -> Result<String>;

    /// Interpreter version string, e.g. `Python 3.11.4`.
    fn python_version(&self) -> Result<String>;

    fn os_kind(&self) -> OsKind;
}

/// Probes the real interpreter and package manager by spawning them.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    python_command: String,
    pip_command: String,
}

impl SystemProbe {
    pub fn new(python_command: impl Into<String>, pip_command: impl Into<String>) -> Self {
        Self {
            python_command: python_command.into(),
            pip_command: pip_command.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.python_command, &config.pip_command)
    }
}

fn run(program: &str, args: &[&str]) -> Result<Output> {
    debug!(program, ?args, "Running");
    Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("Failed to run `{}`", program))
}

impl EnvironmentProbe for SystemProbe {
    fn installed_packages(&self) -> Result<String> {
        let output = run(&self.pip_command, &["freeze"])?;
        if !output.status.success() {
            anyhow::bail!(
                "`{} freeze` failed ({}): {}",
                self.pip_command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn python_version(&self) -> Result<String> {
        let output = run(&self.python_command, &["--version"])?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !stdout.is_empty() {
            return Ok(stdout);
        }
        // Python 2 prints its version to stderr.
        Ok(String::from_utf8_lossy(&output.stderr).trim().to_string())
    }

    fn os_kind(&self) -> OsKind {
        if cfg!(windows) {
            return OsKind::Windows;
        }
        match run("uname", &[]) {
            Ok(output) => OsKind::classify(false, &String::from_utf8_lossy(&output.stdout)),
            Err(_) if std::env::consts::OS == "macos" => OsKind::Mac,
            Err(_) => OsKind::Linux,
        }
    }
}

/// Drop every line mentioning `product` (case-insensitive) and join the rest
/// with newlines.
pub fn filter_requirements(freeze_output: &str, product: &str) -> String {
    let product = product.to_lowercase();
    freeze_output
        .lines()
        .filter(|line| !line.to_lowercase().contains(&product))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_os() {
        assert_eq!(OsKind::classify(true, ""), OsKind::Windows);
        assert_eq!(OsKind::classify(false, "Darwin\n"), OsKind::Mac);
        assert_eq!(OsKind::classify(false, "Linux\n"), OsKind::Linux);
        assert_eq!(OsKind::classify(false, "FreeBSD\n"), OsKind::Linux);
    }

    #[test]
    fn test_os_kind_serializes_as_label() {
        assert_eq!(serde_json::to_string(&OsKind::Mac).unwrap(), r#""Mac""#);
    }

    #[test]
    fn test_filter_requirements_drops_product_lines() {
        let freeze = "numpy==1.26.4\nTaskNode==0.3.0\nrequests==2.31.0\n-e git+https://example.com/tasknode-cli.git#egg=tasknode\n";
        assert_eq!(
            filter_requirements(freeze, "tasknode"),
            "numpy==1.26.4\nrequests==2.31.0"
        );
    }

    #[test]
    fn test_filter_requirements_empty() {
        assert_eq!(filter_requirements("", "tasknode"), "");
    }

    #[test]
    fn test_missing_python_is_an_error() {
        let probe = SystemProbe::new("definitely-not-a-python-binary", "definitely-not-pip");
        assert!(probe.python_version().is_err());
        assert!(probe.installed_packages().is_err());
    }
}
