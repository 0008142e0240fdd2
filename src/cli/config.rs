//! Configuration resolution for the CLI: config file first, then flags

use crate::cli::error::CliResult;
use lazy_version::{IndexOptions, VersionActionConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load `--config`, or discover `lazy-version.toml` upward from `cwd`
pub fn load_config(explicit: Option<&Path>, cwd: &Path) -> CliResult<VersionActionConfig> {
    if let Some(path) = explicit {
        return Ok(VersionActionConfig::load_from_file(path)?);
    }

    match VersionActionConfig::discover(cwd)? {
        Some((path, config)) => {
            debug!("Loaded {}", path.display());
            Ok(config)
        }
        None => Ok(VersionActionConfig::default()),
    }
}

/// Merge command-line overrides onto the config file's index sources
pub fn merge_index_options(
    config: &VersionActionConfig,
    search_paths: &[PathBuf],
    cargo_home: Option<&Path>,
) -> IndexOptions {
    let mut options = config.index_options();
    options.search_paths.extend(search_paths.iter().cloned());
    if let Some(home) = cargo_home {
        options.cargo_home = Some(home.to_path_buf());
    }
    options
}
