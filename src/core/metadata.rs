//! Distribution metadata: installed-package records queryable by name

use crate::core::error::LookupError;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Where a distribution record was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Compiled into the binary (`env!("CARGO_PKG_VERSION")`)
    BuildTime,
    /// A `Cargo.toml` on disk
    Manifest(PathBuf),
    /// An entry in cargo's `.crates.toml` install record
    Installed { source: String },
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::BuildTime => write!(f, "build-time"),
            Origin::Manifest(path) => write!(f, "{}", path.display()),
            Origin::Installed { source } => write!(f, "installed ({})", source),
        }
    }
}

/// A single installed-package record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub name: String,
    pub version: String,
    pub origin: Origin,
}

impl Distribution {
    pub fn new(name: impl Into<String>, version: impl Into<String>, origin: Origin) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            origin,
        }
    }
}

/// Anything that can answer "which version of package X is installed?"
pub trait MetadataSource: Send + Sync {
    /// Look up a single distribution by name
    fn distribution(&self, name: &str) -> Result<Distribution, LookupError>;

    /// Every distribution this source knows about
    fn distributions(&self) -> Vec<Distribution>;

    /// Version string of the named distribution
    fn version(&self, name: &str) -> Result<String, LookupError> {
        self.distribution(name).map(|dist| dist.version)
    }

    /// Whether a distribution with this name exists
    fn contains(&self, name: &str) -> bool {
        self.distribution(name).is_ok()
    }
}

/// Canonical form used to compare package names.
///
/// Cargo treats `-` and `_` as equivalent in package names and lookups are
/// case-insensitive, so `My_Crate` and `my-crate` name the same package.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| match c {
            '_' | '.' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

/// Distributions keyed by normalized name; first insertion wins
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    entries: BTreeMap<String, Distribution>,
}

impl StaticIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a build-time record
    pub fn with(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.insert(Distribution::new(name, version, Origin::BuildTime));
        self
    }

    /// Insert a record, keeping an existing one with the same normalized name
    pub fn insert(&mut self, dist: Distribution) {
        self.entries
            .entry(normalize_name(&dist.name))
            .or_insert(dist);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Distribution> for StaticIndex {
    fn from_iter<I: IntoIterator<Item = Distribution>>(iter: I) -> Self {
        let mut index = StaticIndex::new();
        for dist in iter {
            index.insert(dist);
        }
        index
    }
}

impl MetadataSource for StaticIndex {
    fn distribution(&self, name: &str) -> Result<Distribution, LookupError> {
        self.entries
            .get(&normalize_name(name))
            .cloned()
            .ok_or_else(|| LookupError::PackageNotFound(name.to_string()))
    }

    fn distributions(&self) -> Vec<Distribution> {
        self.entries.values().cloned().collect()
    }
}

/// Ordered composite of sources; the first source that knows a name wins
#[derive(Default)]
pub struct ChainIndex {
    sources: Vec<Box<dyn MetadataSource>>,
}

impl ChainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, source: impl MetadataSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl fmt::Debug for ChainIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainIndex")
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl MetadataSource for ChainIndex {
    fn distribution(&self, name: &str) -> Result<Distribution, LookupError> {
        for source in &self.sources {
            match source.distribution(name) {
                Ok(dist) => return Ok(dist),
                Err(LookupError::PackageNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(LookupError::PackageNotFound(name.to_string()))
    }

    fn distributions(&self) -> Vec<Distribution> {
        let mut seen = StaticIndex::new();
        for source in &self.sources {
            for dist in source.distributions() {
                seen.insert(dist);
            }
        }
        seen.distributions()
    }
}
