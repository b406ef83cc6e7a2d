use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::compatibility::CompatibilityOptions;
use crate::detector::DetectionOptions;
use crate::policy::LicensePolicy;
use crate::report::DocumentOptions;

const CONFIG_DIR: &str = ".license-intel";
const CONFIG_FILE: &str = "config.toml";

/// Root configuration, deserialized from `.license-intel/config.toml`.
///
/// Every section is optional. There is no built-in policy: policy validation
/// needs a `[policy]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub detection: DetectionOptions,
    pub document: DocumentOptions,
    pub compatibility: CompatibilityOptions,
    pub policy: Option<LicensePolicy>,
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`: path passed via `--config`
/// 2. `<project_path>/.license-intel/config.toml`
/// 3. `~/.config/license-intel/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = project_path.join(CONFIG_DIR).join(CONFIG_FILE);
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home_config) = home_config_path() {
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    debug!("no config file found, using defaults");
    Ok(Config::default())
}

fn home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("license-intel").join(CONFIG_FILE))
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = toml::from_str(&content)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}
