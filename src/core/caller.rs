//! Build-time identity of the module registering a version flag
//!
//! Rust has no runtime reflection over the call stack, so the module's name,
//! package and file are captured at compile time by [`caller!`](crate::caller)
//! and carried by the action until it is invoked.

use crate::core::metadata::{Distribution, MetadataSource, Origin};
use std::path::Path;
use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerModule {
    /// `module_path!()` of the registering module, e.g. `my_tool::cli`
    pub module_path: String,
    /// `CARGO_PKG_NAME` the module was compiled with
    pub package: Option<String>,
    /// `CARGO_PKG_VERSION` the module was compiled with
    pub package_version: Option<String>,
    /// `file!()` of the registering module
    pub file: Option<String>,
}

impl CallerModule {
    pub fn new(module_path: impl Into<String>) -> Self {
        Self {
            module_path: module_path.into(),
            package: None,
            package_version: None,
            file: None,
        }
    }

    pub fn with_package(mut self, name: Option<&str>, version: Option<&str>) -> Self {
        self.package = name.filter(|s| !s.is_empty()).map(str::to_string);
        self.package_version = version.filter(|s| !s.is_empty()).map(str::to_string);
        self
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// The caller's own package as a build-time record, if both name and version were captured
    pub fn build_time_distribution(&self) -> Option<Distribution> {
        match (&self.package, &self.package_version) {
            (Some(name), Some(version)) => Some(Distribution::new(
                name.clone(),
                version.clone(),
                Origin::BuildTime,
            )),
            _ => None,
        }
    }

    /// Candidate package names in inference order: crate segment, package, file stem
    pub fn candidates(&self) -> Vec<String> {
        let crate_segment = self
            .module_path
            .split("::")
            .next()
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let file_stem = self.file.as_deref().and_then(|file| {
            Path::new(file)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        });

        let mut candidates: Vec<String> = Vec::with_capacity(3);
        for candidate in [crate_segment, self.package.clone(), file_stem]
            .into_iter()
            .flatten()
        {
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
        candidates
    }

    /// First candidate that names a distribution known to `source`
    pub fn infer_package(&self, source: &dyn MetadataSource) -> Option<String> {
        self.candidates().into_iter().find(|candidate| {
            let found = source.contains(candidate);
            trace!(
                "Inferring package from caller {}: {} -> {}",
                self.module_path,
                candidate,
                found
            );
            found
        })
    }
}

/// Capture the calling module's identity at compile time.
///
/// ```
/// let caller = lazy_version::caller!();
/// assert!(!caller.module_path.is_empty());
/// ```
#[macro_export]
macro_rules! caller {
    () => {
        $crate::CallerModule::new(::core::module_path!())
            .with_package(
                ::core::option_env!("CARGO_PKG_NAME"),
                ::core::option_env!("CARGO_PKG_VERSION"),
            )
            .with_file(::core::file!())
    };
}
