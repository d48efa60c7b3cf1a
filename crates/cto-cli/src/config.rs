//! # Workspace Configuration
//!
//! Optional YAML file (`cto.yaml` by default) naming the schema files of a
//! workspace and the default conversion switches:
//!
//! ```yaml
//! models:
//!   - models/base.cto
//!   - models/fleet.cto
//! resolve: true
//! validate: true
//! ```
//!
//! Relative model paths are taken relative to the file's directory.
//! Command-line flags override every setting.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// File name looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "cto.yaml";

/// Settings shared by the schema-loading subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Schema files loaded when a command is given none.
    pub models: Vec<PathBuf>,
    /// Qualify type references after lowering.
    pub resolve: bool,
    /// Check lowered models against the metamodel schema.
    pub validate: bool,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            models: Vec::new(),
            resolve: false,
            validate: true,
        }
    }
}

impl WorkspaceConfig {
    /// Parse configuration text. Model paths are rebased onto `base_dir`.
    pub fn from_yaml(text: &str, base_dir: &Path) -> Result<Self> {
        let mut config: WorkspaceConfig =
            serde_yaml::from_str(text).context("failed to parse configuration YAML")?;
        for path in &mut config.models {
            if path.is_relative() {
                *path = base_dir.join(&*path);
            }
        }
        Ok(config)
    }

    /// Load the configuration for a run.
    ///
    /// An explicit path must exist. Without one, `cto.yaml` in the working
    /// directory is used when present, and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !fallback.is_file() {
                    tracing::debug!("no configuration file, using defaults");
                    return Ok(Self::default());
                }
                fallback
            }
        };
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read configuration: {}", path.display()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let config = Self::from_yaml(&text, base_dir)
            .with_context(|| format!("invalid configuration: {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            models = config.models.len(),
            "loaded configuration"
        );
        Ok(config)
    }
}
