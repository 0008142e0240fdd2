//! Error types for version flag registration and invocation

use std::path::PathBuf;
use thiserror::Error;

/// Misconfiguration of a version action.
///
/// Everything except [`ConfigError::UninferrablePackage`] is raised while the
/// flag is being registered, before any user input is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Version action '{id}' needs a short or long flag name")]
    MissingFlag { id: String },

    #[error(
        "Missing 'version_from' for version action '{id}' and no caller module was captured to infer it from"
    )]
    MissingVersionFrom { id: String },

    #[error("Missing '%(version)s' placeholder in version action's 'version' argument: {template:?}")]
    MissingVersionPlaceholder { template: String },

    #[error("Unknown placeholder '%({name})s' in version template {template:?} (expected 'version' or 'prog')")]
    UnknownPlaceholder { name: String, template: String },

    #[error("Malformed version template {template:?}: stray '%' at byte {offset}")]
    MalformedTemplate { template: String, offset: usize },

    #[error(
        "Argument 'version_from' for version action is missing and inferred package name from caller module '{caller}' could not be found"
    )]
    UninferrablePackage { caller: String },

    #[error("Failed to load config from {}: {message}", path.display())]
    File { path: PathBuf, message: String },
}

/// Failure to find or read distribution metadata.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("No package metadata was found for {0}")]
    PackageNotFound(String),

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest {}: {message}", path.display())]
    Manifest { path: PathBuf, message: String },

    #[error("Invalid version '{version}' for package {name}: {message}")]
    InvalidVersion {
        name: String,
        version: String,
        message: String,
    },
}

/// Outcome of parsing that did not produce matches.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Clap(#[from] clap::Error),

    /// The version flag was passed; holds the rendered, newline-terminated line.
    #[error("{0}")]
    DisplayVersion(String),
}

impl Error {
    /// Process exit status matching this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::DisplayVersion(_) => 0,
            Error::Clap(e) => e.exit_code(),
            Error::Config(_) | Error::Lookup(_) => 1,
        }
    }

    /// Whether this is the successful "print the version" outcome
    pub fn is_display_version(&self) -> bool {
        matches!(self, Error::DisplayVersion(_))
    }

    /// Print the outcome: the version line to stdout, anything else to stderr
    pub fn print(&self) -> std::io::Result<()> {
        use std::io::Write;

        match self {
            Error::DisplayVersion(line) => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(line.as_bytes())?;
                stdout.flush()
            }
            Error::Clap(e) => e.print(),
            other => {
                let mut stderr = std::io::stderr().lock();
                writeln!(stderr, "error: {}", other)
            }
        }
    }

    /// Print the outcome and terminate the process with [`Error::exit_code`]
    pub fn exit(&self) -> ! {
        let _ = self.print();
        std::process::exit(self.exit_code())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
