//! Packages recorded by `cargo install` in `$CARGO_HOME/.crates.toml`

use crate::core::error::LookupError;
use crate::core::metadata::{Distribution, MetadataSource, Origin, StaticIndex};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const INSTALL_RECORD_FILE: &str = ".crates.toml";

#[derive(Debug, Default, Deserialize)]
struct CratesToml {
    #[serde(default)]
    v1: BTreeMap<String, Vec<String>>,
}

/// Resolve cargo's home directory: `$CARGO_HOME`, else `~/.cargo`
pub fn default_cargo_home() -> Option<PathBuf> {
    match std::env::var_os("CARGO_HOME") {
        Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
        _ => dirs::home_dir().map(|home| home.join(".cargo")),
    }
}

/// Index over cargo's install record
#[derive(Debug, Clone, Default)]
pub struct InstalledIndex {
    index: StaticIndex,
}

impl InstalledIndex {
    /// Load `<cargo_home>/.crates.toml`; a missing file yields an empty index
    pub fn load(cargo_home: &Path) -> Result<Self, LookupError> {
        let path = cargo_home.join(INSTALL_RECORD_FILE);
        if !path.exists() {
            debug!("No install record at {}", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| LookupError::Io {
            path: path.clone(),
            source,
        })?;

        Self::parse(&content).map_err(|message| LookupError::Manifest { path, message })
    }

    /// Parse the contents of a `.crates.toml` file
    pub fn parse(content: &str) -> Result<Self, String> {
        let record: CratesToml = toml::from_str(content).map_err(|e| e.to_string())?;

        let mut index = StaticIndex::new();
        for key in record.v1.keys() {
            match parse_package_id(key) {
                Some(dist) => index.insert(dist),
                None => warn!("Unrecognised install record entry: {}", key),
            }
        }

        debug!("Install record lists {} package(s)", index.len());
        Ok(Self { index })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl MetadataSource for InstalledIndex {
    fn distribution(&self, name: &str) -> Result<Distribution, LookupError> {
        self.index.distribution(name)
    }

    fn distributions(&self) -> Vec<Distribution> {
        self.index.distributions()
    }
}

/// Split a package id such as `ripgrep 14.1.0 (registry+https://...)`
fn parse_package_id(key: &str) -> Option<Distribution> {
    let mut parts = key.splitn(3, ' ');
    let name = parts.next().filter(|s| !s.is_empty())?;
    let version = parts.next().filter(|s| !s.is_empty())?;
    let source = parts
        .next()
        .map(|s| s.trim().trim_start_matches('(').trim_end_matches(')'))
        .unwrap_or_default();

    Some(Distribution::new(
        name,
        version,
        Origin::Installed {
            source: source.to_string(),
        },
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RECORD: &str = r#"[v1]
"ripgrep 14.1.0 (registry+https://github.com/rust-lang/crates.io-index)" = ["rg"]
"cargo-edit 0.12.2 (registry+https://github.com/rust-lang/crates.io-index)" = ["cargo-add", "cargo-rm"]
"#;

    #[test]
    fn test_parse_record() {
        let index = InstalledIndex::parse(RECORD).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.version("ripgrep").unwrap(), "14.1.0");

        let dist = index.distribution("cargo_edit").unwrap();
        assert_eq!(dist.version, "0.12.2");
        assert_eq!(
            dist.origin,
            Origin::Installed {
                source: "registry+https://github.com/rust-lang/crates.io-index".to_string()
            }
        );
    }

    #[test]
    fn test_missing_record_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let index = InstalledIndex::load(temp_dir.path()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_load_from_cargo_home() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(INSTALL_RECORD_FILE), RECORD).unwrap();

        let index = InstalledIndex::load(temp_dir.path()).unwrap();
        assert!(index.contains("ripgrep"));
    }

    #[test]
    fn test_invalid_record() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(INSTALL_RECORD_FILE), "[v1\n").unwrap();

        let err = InstalledIndex::load(temp_dir.path()).unwrap_err();
        assert!(matches!(err, LookupError::Manifest { .. }));
    }

    #[test]
    fn test_malformed_key_is_skipped() {
        let index = InstalledIndex::parse("[v1]\n\"lonely\" = []\n").unwrap();
        assert!(index.is_empty());
    }
}
