//! Path helpers for a project under test.
use crate::config::{HarnessConfig, HARNESS_CONFIG_REL};
use std::path::{Path, PathBuf};

/// Derives harness paths from the project root.
#[derive(Debug, Clone)]
pub struct HarnessPaths {
    root: PathBuf,
}

impl HarnessPaths {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Return the `sut/harness.json` path.
    pub fn config_path(&self) -> PathBuf {
        self.root.join(HARNESS_CONFIG_REL)
    }

    /// Return the scenario document directory named by `config`.
    pub fn scenarios_dir(&self, config: &HarnessConfig) -> PathBuf {
        self.root.join(&config.scenarios_dir)
    }

    /// Return the document path for scenario `name`.
    pub fn scenario_path(&self, config: &HarnessConfig, name: &str) -> PathBuf {
        self.scenarios_dir(config).join(format!("{name}.json"))
    }
}
