//! `lazy-version.toml` configuration and its discovery

use crate::core::action::VersionAction;
use crate::core::error::ConfigError;
use crate::core::lazy::IndexOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE: &str = "lazy-version.toml";

/// Options a version flag can take from a config file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionActionConfig {
    /// Package whose version is reported
    #[serde(default)]
    pub version_from: Option<String>,
    /// Percent-style template
    #[serde(default)]
    pub version: Option<String>,
    /// Directories scanned for Cargo manifests, relative to the config file
    #[serde(default)]
    pub search_paths: Vec<PathBuf>,
    /// Cargo home holding `.crates.toml`, relative to the config file
    #[serde(default)]
    pub cargo_home: Option<PathBuf>,
}

impl VersionActionConfig {
    /// Load configuration from a TOML file, anchoring relative paths at its directory
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::File {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config: VersionActionConfig =
            toml::from_str(&content).map_err(|e| ConfigError::File {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.search_paths = config
            .search_paths
            .into_iter()
            .map(|p| base.join(p))
            .collect();
        config.cargo_home = config.cargo_home.map(|p| base.join(p));

        Ok(config)
    }

    /// Find and load the nearest config file at or above `start`
    pub fn discover(start: &Path) -> Result<Option<(PathBuf, Self)>, ConfigError> {
        match find_config_file(start) {
            Some(path) => {
                debug!("Using config file {}", path.display());
                let config = Self::load_from_file(&path)?;
                Ok(Some((path, config)))
            }
            None => Ok(None),
        }
    }

    /// Index sources described by this configuration
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            search_paths: self.search_paths.clone(),
            cargo_home: self.cargo_home.clone(),
            ..Default::default()
        }
    }

    /// Layer the file's settings onto an action
    pub fn apply(&self, mut action: VersionAction) -> VersionAction {
        if let Some(version_from) = &self.version_from {
            action = action.version_from(version_from.clone());
        }
        if let Some(version) = &self.version {
            action = action.template(version.clone());
        }
        action.index_options(self.index_options())
    }
}

/// Walk up from `start` looking for `lazy-version.toml`
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}
