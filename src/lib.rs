//! # lazy-version
//!
//! A `--version` flag for [`clap`] whose value is resolved lazily. Building the
//! command and registering the flag is cheap; package metadata (build-time
//! records, `Cargo.toml` manifests, cargo's install record) is only read when
//! the flag is actually passed.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use clap::{Arg, Command};
//! use lazy_version::{caller, VersionAction, VersionedCommand};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cmd = VersionedCommand::new(Command::new("mytool").arg(Arg::new("input").required(true)))
//!         .version_template("%(prog)s %(version)s")
//!         .add_version_flag(VersionAction::default().caller(caller!()))?;
//!
//!     // `mytool --version` prints "mytool 1.2.3" and exits with status 0
//!     let matches = cmd.get_matches();
//!     println!("{:?}", matches.get_one::<String>("input"));
//!     Ok(())
//! }
//! ```

pub mod core;

pub use crate::core::action::{RegisteredAction, VersionAction, VersionedCommand};
pub use crate::core::caller::CallerModule;
pub use crate::core::config::VersionActionConfig;
pub use crate::core::error::{ConfigError, Error, LookupError, Result};
pub use crate::core::lazy::{IndexOptions, LazyIndex};
pub use crate::core::metadata::{Distribution, MetadataSource, Origin, StaticIndex};
pub use crate::core::template::VersionTemplate;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging to stderr (safe to call more than once)
///
/// `RUST_LOG` wins when set; otherwise `default_directive` applies,
/// e.g. `"lazy_version=warn"`.
pub fn init_logging(default_directive: &str) {
    // Only initialize logging once
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();

        // This will fail silently if already initialized
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::Command;
    use std::sync::Arc;

    #[test]
    fn test_own_version_through_caller() {
        init_logging("lazy_version=debug");

        let index = Arc::new(LazyIndex::new(|| {
            Ok(StaticIndex::new().with(env!("CARGO_PKG_NAME"), VERSION))
        }));
        let cmd = VersionedCommand::new(Command::new("lazy-version"))
            .add_version_flag(
                VersionAction::default()
                    .caller(caller!())
                    .index(Arc::clone(&index)),
            )
            .unwrap();
        assert!(!index.is_initialized());

        match cmd.try_get_matches_from(["lazy-version", "--version"]) {
            Err(Error::DisplayVersion(line)) => assert_eq!(line, format!("{}\n", VERSION)),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(index.is_initialized());
    }
}
