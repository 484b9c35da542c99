//! Optimizer configuration
//!
//! Configuration lives in `.claude/optimizer.toml` under the project root.
//! A missing file means defaults.

pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::bail_invalid;
use crate::error::{OptimizerError, Result};
use crate::rules::RuleSet;

pub use types::{OptimizerConfig, RulesConfig};

pub const CONFIG_DIR: &str = ".claude";
pub const CONFIG_FILE: &str = "optimizer.toml";

/// `<project>/.claude/optimizer.toml`
pub fn config_path(project: &Path) -> PathBuf {
    project.join(CONFIG_DIR).join(CONFIG_FILE)
}

impl OptimizerConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: OptimizerConfig = toml::from_str(&content)?;
        if config.stale_after_days < 0 {
            bail_invalid!("stale_after_days", config.stale_after_days);
        }
        Ok(config)
    }

    /// Load the project's configuration, or defaults if it has none
    pub fn load_for_project(project: &Path) -> Result<Self> {
        let path = config_path(project);
        if !path.exists() {
            debug!(path = %path.display(), "no optimizer config; using defaults");
            return Ok(Self::default());
        }
        Self::load(&path)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| OptimizerError::Other(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Default rules adjusted by the `[rules]` table
    pub fn rule_set(&self) -> Result<RuleSet> {
        RuleSet::from_config(&self.rules)
    }
}
