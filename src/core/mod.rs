//! Core modules: the version action, its templates and the metadata index

pub mod action;
pub mod caller;
pub mod config;
pub mod error;
pub mod installed;
pub mod lazy;
pub mod manifest;
pub mod metadata;
pub mod template;

// Re-export main types for convenience
pub use action::{RegisteredAction, VersionAction, VersionedCommand};
pub use caller::CallerModule;
pub use config::{find_config_file, VersionActionConfig, CONFIG_FILE};
pub use error::{ConfigError, Error, LookupError, Result};
pub use installed::{default_cargo_home, InstalledIndex};
pub use lazy::{IndexOptions, LazyIndex};
pub use manifest::{CargoManifest, ManifestIndex};
pub use metadata::{normalize_name, ChainIndex, Distribution, MetadataSource, Origin, StaticIndex};
pub use template::{VersionTemplate, DEFAULT_TEMPLATE};
