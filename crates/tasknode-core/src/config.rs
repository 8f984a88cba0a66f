//! Application configuration management.
//!
//! Configuration is read from `~/.config/tasknode/config.json` when present,
//! then overridden by `TASKNODE_*` environment variables. Every field has a
//! default, so an empty or missing file is valid.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "tasknode";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_URL: &str = "https://api-dev.tasknode.dev";
const DEFAULT_SERVICE_NAME: &str = "tasknode-cli";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the tasknode backend
    pub api_url: String,
    /// Keychain service name the session tokens are stored under
    pub service_name: String,
    /// Interpreter used to record the Python version
    pub python_command: String,
    /// Command used to snapshot installed packages
    pub pip_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            python_command: "python".to_string(),
            pip_command: "pip".to_string(),
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_path() {
            Ok(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config file {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?
            }
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply `TASKNODE_*` overrides from the given lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TASKNODE_API_URL") {
            self.api_url = url;
        }
        if let Some(service) = lookup("TASKNODE_SERVICE_NAME") {
            self.service_name = service;
        }
        if let Some(python) = lookup("TASKNODE_PYTHON") {
            self.python_command = python;
        }
        if let Some(pip) = lookup("TASKNODE_PIP") {
            self.pip_command = pip;
        }
        self.api_url = self.api_url.trim_end_matches('/').to_string();
    }

    /// Build a config pointing at a different backend, keeping other defaults.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        let mut config = Self {
            api_url: api_url.into(),
            ..Self::default()
        };
        config.apply_overrides(|_| None);
        config
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}
