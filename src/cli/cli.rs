//! Main CLI application structure

use clap::{CommandFactory, FromArgMatches, Parser};
use lazy_version::{caller, ConfigError, LazyIndex, StaticIndex, VersionAction, VersionedCommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::cli::commands::{list, show, Commands};
use crate::cli::config::{load_config, merge_index_options};
use crate::cli::error::{CliError, CliResult};

/// lazy-version - look up package versions the way a lazy --version flag does
#[derive(Debug, Parser)]
#[command(name = "lazy-version")]
#[command(about = "Resolve and print package versions from build-time records, Cargo manifests and cargo's install record")]
#[command(long_about = "Resolve and print package versions.\n\n\
                         `show` and `list` consult, in this order:\n\
                         1. Cargo.toml manifests below the search paths (default: current directory)\n\
                         2. cargo's install record ($CARGO_HOME/.crates.toml)\n\n\
                         `--version` reports this binary's own build-time version and reads no files.\n\n\
                         Defaults for `show` are read from lazy-version.toml, discovered upward from the current directory.\n\n\
                         Examples:\n\
                           lazy-version show serde --search-path ./vendor\n\
                           lazy-version show my-crate --template '%(prog)s %(version)s'\n\
                           lazy-version list")]
#[command(disable_version_flag = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to lazy-version.toml (overrides discovery)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory scanned for Cargo manifests (repeatable)
    #[arg(long = "search-path", global = true)]
    pub search_paths: Vec<PathBuf>,

    /// Cargo home holding .crates.toml (default: $CARGO_HOME or ~/.cargo)
    #[arg(long, global = true)]
    pub cargo_home: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// The CLI command with the lazy `-V, --version` flag attached
///
/// The flag reports this binary's own build-time version, so its index holds
/// only that record and never scans the filesystem.
pub fn build_command() -> Result<VersionedCommand, ConfigError> {
    let caller = caller!();
    let builtin: StaticIndex = caller.build_time_distribution().into_iter().collect();
    let index = Arc::new(LazyIndex::new(move || Ok(builtin.clone())));

    VersionedCommand::new(Cli::command())
        .version_template("%(prog)s %(version)s")
        .add_version_flag(VersionAction::default().caller(caller).index(index))
}

impl Cli {
    /// Parse arguments; `--version` prints and exits inside
    pub fn parse_from_env() -> CliResult<Self> {
        let command = build_command()?;
        let matches = command.get_matches();
        Cli::from_arg_matches(&matches).map_err(|e| CliError::Usage(e.to_string()))
    }

    /// Execute the CLI command
    pub fn execute(self) -> CliResult<()> {
        let directive = if self.verbose {
            "lazy_version=debug"
        } else {
            "lazy_version=warn"
        };
        lazy_version::init_logging(directive);

        let cwd = std::env::current_dir()?;
        let config = load_config(self.config.as_deref(), &cwd)?;
        let options = merge_index_options(&config, &self.search_paths, self.cargo_home.as_deref());

        match self.command {
            Commands::Show(args) => show::execute_show(args, &config, options),
            Commands::List(args) => list::execute_list(args, options),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_command_registers_version_flag() {
        let command = build_command().unwrap();
        assert_eq!(command.version_actions().len(), 1);
        assert!(!command.version_actions()[0].index().is_initialized());
    }

    #[test]
    fn test_long_about_names_sources() {
        let about = Cli::command().get_long_about().unwrap().to_string();
        assert!(about.contains("Cargo.toml manifests"));
        assert!(about.contains(".crates.toml"));
        assert!(about.contains("build-time version"));
    }

    #[test]
    fn test_parse_show() {
        let command = build_command().unwrap();
        let matches = command
            .try_get_matches_from(["lazy-version", "show", "serde", "--search-path", "/tmp"])
            .unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();

        assert_eq!(cli.search_paths, vec![PathBuf::from("/tmp")]);
        match cli.command {
            Commands::Show(args) => assert_eq!(args.name.as_deref(), Some("serde")),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
