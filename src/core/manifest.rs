//! Cargo manifest scanning: distributions found in `Cargo.toml` files on disk

use crate::core::error::LookupError;
use crate::core::metadata::{Distribution, MetadataSource, Origin, StaticIndex};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

pub const MANIFEST_FILE: &str = "Cargo.toml";

/// Cargo's implicit version when `[package].version` is omitted
const IMPLICIT_VERSION: &str = "0.0.0";

const DEFAULT_MAX_DEPTH: usize = 8;

/// The subset of `Cargo.toml` needed to identify a package
#[derive(Debug, Clone, Deserialize)]
pub struct CargoManifest {
    #[serde(default)]
    pub package: Option<PackageTable>,
    #[serde(default)]
    pub workspace: Option<WorkspaceTable>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PackageTable {
    pub name: String,
    #[serde(default)]
    pub version: Option<VersionField>,
}

/// `version = "1.2.3"` or `version.workspace = true`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum VersionField {
    Literal(String),
    Inherited { workspace: bool },
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceTable {
    #[serde(default)]
    pub package: Option<WorkspacePackage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkspacePackage {
    #[serde(default)]
    pub version: Option<String>,
}

impl CargoManifest {
    /// Load a manifest from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, LookupError> {
        let content = std::fs::read_to_string(path).map_err(|source| LookupError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| LookupError::Manifest {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn workspace_version(&self) -> Option<&str> {
        self.workspace
            .as_ref()
            .and_then(|ws| ws.package.as_ref())
            .and_then(|pkg| pkg.version.as_deref())
    }
}

/// Distributions read from every `Cargo.toml` below a set of search roots
#[derive(Debug, Clone)]
pub struct ManifestIndex {
    index: StaticIndex,
}

impl ManifestIndex {
    /// Walk each root and collect the packages it contains
    ///
    /// Hidden directories and `target/` are skipped. Unreadable or invalid
    /// manifests are logged and ignored so one broken crate does not hide the rest.
    pub fn scan<P: AsRef<Path>>(roots: &[P]) -> Self {
        Self::scan_with_depth(roots, DEFAULT_MAX_DEPTH)
    }

    pub fn scan_with_depth<P: AsRef<Path>>(roots: &[P], max_depth: usize) -> Self {
        let mut resolver = WorkspaceResolver::default();
        let mut index = StaticIndex::new();

        for root in roots {
            let root = root.as_ref();
            if !root.is_dir() {
                debug!("Skipping missing search path {}", root.display());
                continue;
            }

            let walker = WalkDir::new(root)
                .max_depth(max_depth)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_skipped_dir(entry));

            for entry in walker {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Failed to walk {}: {}", root.display(), e);
                        continue;
                    }
                };

                if !entry.file_type().is_file() || entry.file_name() != MANIFEST_FILE {
                    continue;
                }

                match load_distribution(entry.path(), &mut resolver) {
                    Ok(Some(dist)) => {
                        trace!("Found {} {} in {}", dist.name, dist.version, dist.origin);
                        index.insert(dist);
                    }
                    Ok(None) => {}
                    Err(e) => warn!("Ignoring manifest: {}", e),
                }
            }
        }

        debug!("Manifest scan found {} package(s)", index.len());
        Self { index }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl MetadataSource for ManifestIndex {
    fn distribution(&self, name: &str) -> Result<Distribution, LookupError> {
        self.index.distribution(name)
    }

    fn distributions(&self) -> Vec<Distribution> {
        self.index.distributions()
    }
}

/// Read the package record from one manifest; `Ok(None)` for virtual workspaces
pub fn load_distribution(
    path: &Path,
    resolver: &mut WorkspaceResolver,
) -> Result<Option<Distribution>, LookupError> {
    let manifest = CargoManifest::load_from_file(path)?;
    let Some(package) = manifest.package else {
        return Ok(None);
    };

    let version = match package.version {
        Some(VersionField::Literal(version)) => version,
        Some(VersionField::Inherited { workspace: true }) => {
            resolver.inherited_version(path).ok_or_else(|| LookupError::Manifest {
                path: path.to_path_buf(),
                message: "version.workspace = true but no [workspace.package].version found"
                    .to_string(),
            })?
        }
        Some(VersionField::Inherited { workspace: false }) => {
            return Err(LookupError::Manifest {
                path: path.to_path_buf(),
                message: "version.workspace must be true when present".to_string(),
            })
        }
        None => IMPLICIT_VERSION.to_string(),
    };

    semver::Version::parse(&version).map_err(|e| LookupError::InvalidVersion {
        name: package.name.clone(),
        version: version.clone(),
        message: e.to_string(),
    })?;

    Ok(Some(Distribution::new(
        package.name,
        version,
        Origin::Manifest(path.to_path_buf()),
    )))
}

/// Resolves `version.workspace = true` against ancestor workspace manifests
#[derive(Debug, Default)]
pub struct WorkspaceResolver {
    cache: HashMap<PathBuf, Option<String>>,
}

impl WorkspaceResolver {
    /// Version from the nearest ancestor `[workspace.package]`, starting at the manifest's own directory
    pub fn inherited_version(&mut self, manifest_path: &Path) -> Option<String> {
        let mut current = manifest_path.parent();
        while let Some(dir) = current {
            let candidate = dir.join(MANIFEST_FILE);
            if let Some(version) = self.workspace_version_at(&candidate) {
                return Some(version);
            }
            current = dir.parent();
        }
        None
    }

    fn workspace_version_at(&mut self, candidate: &Path) -> Option<String> {
        if let Some(cached) = self.cache.get(candidate) {
            return cached.clone();
        }

        let version = if candidate.is_file() {
            CargoManifest::load_from_file(candidate)
                .ok()
                .and_then(|m| m.workspace_version().map(str::to_string))
        } else {
            None
        };

        self.cache.insert(candidate.to_path_buf(), version.clone());
        version
    }
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "target"
}
