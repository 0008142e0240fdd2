//! Deferred construction of the metadata index
//!
//! Scanning manifests and reading cargo's install record is far more work than
//! building a `clap::Command`, and most runs never pass `--version`. The index
//! is therefore built on first use only, at most once per process.

use crate::core::error::LookupError;
use crate::core::installed::{default_cargo_home, InstalledIndex};
use crate::core::manifest::ManifestIndex;
use crate::core::metadata::{ChainIndex, Distribution, MetadataSource, StaticIndex};
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

type IndexFactory = Box<dyn Fn() -> Result<Box<dyn MetadataSource>, LookupError> + Send + Sync>;

/// A metadata source that is only built when it is first queried
pub struct LazyIndex {
    cell: OnceCell<Box<dyn MetadataSource>>,
    factory: IndexFactory,
}

impl LazyIndex {
    pub fn new<F, S>(factory: F) -> Self
    where
        F: Fn() -> Result<S, LookupError> + Send + Sync + 'static,
        S: MetadataSource + 'static,
    {
        Self {
            cell: OnceCell::new(),
            factory: Box::new(move || {
                factory().map(|source| Box::new(source) as Box<dyn MetadataSource>)
            }),
        }
    }

    /// Lazy index over the default sources described by `options`
    pub fn from_options(options: IndexOptions) -> Self {
        Self::new(move || options.build())
    }

    /// Build the index if needed and return it
    ///
    /// A failed build leaves the cell empty so a later call retries.
    pub fn get(&self) -> Result<&dyn MetadataSource, LookupError> {
        self.cell
            .get_or_try_init(|| {
                debug!("Initializing package metadata index");
                (self.factory)()
            })
            .map(|source| source.as_ref())
    }

    /// Whether the underlying index has been built
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl fmt::Debug for LazyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyIndex")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

impl MetadataSource for LazyIndex {
    fn distribution(&self, name: &str) -> Result<Distribution, LookupError> {
        self.get()?.distribution(name)
    }

    fn distributions(&self) -> Vec<Distribution> {
        match self.get() {
            Ok(source) => source.distributions(),
            Err(e) => {
                warn!("Package metadata index unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

/// Inputs of the default index: build-time records, manifests, install record
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Records compiled into the binary; consulted first
    pub builtin: StaticIndex,
    /// Directories scanned for `Cargo.toml`; the current directory when empty
    pub search_paths: Vec<PathBuf>,
    /// Cargo home holding `.crates.toml`; `$CARGO_HOME` or `~/.cargo` when unset
    pub cargo_home: Option<PathBuf>,
}

impl IndexOptions {
    /// Build the chained index
    pub fn build(&self) -> Result<ChainIndex, LookupError> {
        let search_paths = if self.search_paths.is_empty() {
            let cwd = std::env::current_dir().map_err(|source| LookupError::Io {
                path: PathBuf::from("."),
                source,
            })?;
            vec![cwd]
        } else {
            self.search_paths.clone()
        };

        let installed = match self.cargo_home.clone().or_else(default_cargo_home) {
            Some(home) => InstalledIndex::load(&home).unwrap_or_else(|e| {
                warn!("Ignoring install record: {}", e);
                InstalledIndex::default()
            }),
            None => InstalledIndex::default(),
        };

        Ok(ChainIndex::new()
            .push(self.builtin.clone())
            .push(ManifestIndex::scan(&search_paths))
            .push(installed))
    }
}
