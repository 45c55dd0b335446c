//! Harness configuration helpers.
//!
//! The config file is optional; a project without `sut/harness.json` runs on
//! the defaults below.
use crate::console::DEFAULT_BANNER_WIDTH;
use crate::paths::HarnessPaths;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const CONFIG_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_SCENARIOS_DIR: &str = "sut/scenarios";
pub const HARNESS_CONFIG_REL: &str = "sut/harness.json";

const MIN_BANNER_WIDTH: usize = 20;

/// Project-owned configuration for scenario selection and reporting.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HarnessConfig {
    pub schema_version: u32,
    #[serde(default = "default_scenarios_dir")]
    pub scenarios_dir: String,
    #[serde(default = "default_banner_width")]
    pub banner_width: usize,
}

fn default_scenarios_dir() -> String {
    DEFAULT_SCENARIOS_DIR.to_string()
}

fn default_banner_width() -> usize {
    DEFAULT_BANNER_WIDTH
}

pub fn default_config() -> HarnessConfig {
    HarnessConfig {
        schema_version: CONFIG_SCHEMA_VERSION,
        scenarios_dir: default_scenarios_dir(),
        banner_width: default_banner_width(),
    }
}

/// Render a pretty JSON config stub for new projects.
pub fn config_stub() -> String {
    let config = default_config();
    serde_json::to_string_pretty(&config).expect("serialize config stub")
}

/// Load and validate `sut/harness.json` under `root`.
pub fn load_config(root: &Path) -> Result<HarnessConfig> {
    let paths = HarnessPaths::new(root.to_path_buf());
    let path = paths.config_path();
    let bytes = fs::read(&path).with_context(|| format!("read config {}", path.display()))?;
    let config: HarnessConfig =
        serde_json::from_slice(&bytes).context("parse harness config JSON")?;
    validate_config(&config)?;
    Ok(config)
}

/// Like [`load_config`], falling back to [`default_config`] when the file is
/// absent.
pub fn load_config_or_default(root: &Path) -> Result<HarnessConfig> {
    let paths = HarnessPaths::new(root.to_path_buf());
    if !paths.config_path().is_file() {
        tracing::debug!(root = %root.display(), "no harness config; using defaults");
        return Ok(default_config());
    }
    load_config(root)
}

pub fn validate_config(config: &HarnessConfig) -> Result<()> {
    if config.schema_version != CONFIG_SCHEMA_VERSION {
        return Err(anyhow!(
            "unsupported harness config schema_version {}",
            config.schema_version
        ));
    }
    if config.scenarios_dir.trim().is_empty() {
        return Err(anyhow!("scenarios_dir must be non-empty"));
    }
    validate_relative_path(&config.scenarios_dir, "scenarios_dir")?;
    if config.banner_width < MIN_BANNER_WIDTH {
        return Err(anyhow!(
            "banner_width must be at least {MIN_BANNER_WIDTH} (got {})",
            config.banner_width
        ));
    }
    Ok(())
}

fn validate_relative_path(rel: &str, label: &str) -> Result<()> {
    let path = Path::new(rel);
    if path.is_absolute() || has_parent_components(path) {
        return Err(anyhow!(
            "{label} must be a relative path without '..' (got {rel:?})"
        ));
    }
    Ok(())
}

pub(crate) fn has_parent_components(path: &Path) -> bool {
    path.components()
        .any(|component| matches!(component, std::path::Component::ParentDir))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
