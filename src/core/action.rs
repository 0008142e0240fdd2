//! The lazily resolved version flag and the command wrapper that hosts it
//!
//! Registration ([`VersionedCommand::add_version_flag`]) validates the action
//! eagerly but never touches package metadata. Only when the flag shows up on
//! the command line is the metadata index built, the package name resolved,
//! and the version rendered.

use crate::core::caller::CallerModule;
use crate::core::error::{ConfigError, Error, Result};
use crate::core::lazy::{IndexOptions, LazyIndex};
use crate::core::template::VersionTemplate;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_ID: &str = "version";
const DEFAULT_HELP: &str = "Print version";

/// Configuration of a version flag, as written by the caller
#[derive(Debug, Clone)]
pub struct VersionAction {
    id: String,
    short: Option<char>,
    long: Option<String>,
    help: Option<String>,
    version_from: Option<String>,
    template: Option<String>,
    caller: Option<CallerModule>,
    index: Option<Arc<LazyIndex>>,
    index_options: IndexOptions,
}

impl VersionAction {
    /// A flag with the given argument id and no names yet
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            short: None,
            long: None,
            help: None,
            version_from: None,
            template: None,
            caller: None,
            index: None,
            index_options: IndexOptions::default(),
        }
    }

    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    pub fn long(mut self, long: impl Into<String>) -> Self {
        self.long = Some(long.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Explicit package whose version is reported
    pub fn version_from(mut self, package: impl Into<String>) -> Self {
        self.version_from = Some(package.into());
        self
    }

    /// Percent-style template overriding the parser's, e.g. `"%(prog)s %(version)s"`
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Module to infer the package name from when `version_from` is not set
    pub fn caller(mut self, caller: CallerModule) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Use a specific (shared) lazy index instead of building the default one
    pub fn index(mut self, index: Arc<LazyIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Sources for the default index; ignored when [`VersionAction::index`] is set
    pub fn index_options(mut self, options: IndexOptions) -> Self {
        self.index_options = options;
        self
    }

    pub fn get_id(&self) -> &str {
        &self.id
    }

    pub fn get_version_from(&self) -> Option<&str> {
        self.version_from.as_deref()
    }

    pub fn get_template(&self) -> Option<&str> {
        self.template.as_deref()
    }

    /// Check the configuration against the parser's template and freeze it
    fn register(self, parser_template: Option<&str>) -> std::result::Result<RegisteredAction, ConfigError> {
        if self.short.is_none() && self.long.is_none() {
            return Err(ConfigError::MissingFlag { id: self.id });
        }

        if self.version_from.is_none() && self.caller.is_none() {
            return Err(ConfigError::MissingVersionFrom { id: self.id });
        }

        let template = self
            .template
            .as_deref()
            .map(VersionTemplate::parse)
            .transpose()?;
        if let Some(parser_template) = parser_template {
            VersionTemplate::parse(parser_template)?;
        }

        let index = match self.index {
            Some(index) => index,
            None => {
                let mut options = self.index_options;
                if let Some(dist) = self.caller.as_ref().and_then(|c| c.build_time_distribution()) {
                    options.builtin.insert(dist);
                }
                Arc::new(LazyIndex::from_options(options))
            }
        };

        Ok(RegisteredAction {
            id: self.id,
            short: self.short,
            long: self.long,
            help: self.help.unwrap_or_else(|| DEFAULT_HELP.to_string()),
            version_from: self.version_from,
            template,
            caller: self.caller,
            index,
        })
    }
}

impl Default for VersionAction {
    /// `-V, --version`
    fn default() -> Self {
        Self::new(DEFAULT_ID).short('V').long(DEFAULT_ID)
    }
}

/// A validated version flag attached to a [`VersionedCommand`]
#[derive(Debug, Clone)]
pub struct RegisteredAction {
    id: String,
    short: Option<char>,
    long: Option<String>,
    help: String,
    version_from: Option<String>,
    template: Option<VersionTemplate>,
    caller: Option<CallerModule>,
    index: Arc<LazyIndex>,
}

impl RegisteredAction {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The metadata index this flag reads from when invoked
    pub fn index(&self) -> &Arc<LazyIndex> {
        &self.index
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.id.clone())
            .action(ArgAction::Count)
            .help(self.help.clone());
        if let Some(short) = self.short {
            arg = arg.short(short);
        }
        if let Some(long) = &self.long {
            arg = arg.long(long.clone());
        }
        arg
    }

    fn is_present(&self, matches: &ArgMatches) -> bool {
        matches.value_source(&self.id) == Some(ValueSource::CommandLine)
    }

    /// Name of the package to report: explicit, or inferred from the caller
    pub fn resolve_package(&self) -> Result<String> {
        if let Some(name) = &self.version_from {
            return Ok(name.clone());
        }

        let Some(caller) = &self.caller else {
            return Err(ConfigError::MissingVersionFrom {
                id: self.id.clone(),
            }
            .into());
        };

        let index = self.index.get()?;
        caller.infer_package(index).ok_or_else(|| {
            ConfigError::UninferrablePackage {
                caller: caller.module_path.clone(),
            }
            .into()
        })
    }

    /// Resolve, look up and render the version line (newline-terminated)
    pub fn render(&self, prog: &str, parser_template: Option<&str>) -> Result<String> {
        let package = self.resolve_package()?;
        debug!("Resolving version of package '{}'", package);

        let version = self.index.get()?.version(&package)?;

        let template = match (&self.template, parser_template) {
            (Some(template), _) => template.clone(),
            (None, Some(parser_template)) => VersionTemplate::parse(parser_template)?,
            (None, None) => VersionTemplate::default(),
        };

        let mut line = template.render(prog, &version);
        line.push('\n');
        Ok(line)
    }
}

/// A `clap::Command` carrying lazily resolved version flags
#[derive(Debug, Clone)]
pub struct VersionedCommand {
    command: Command,
    version_template: Option<String>,
    actions: Vec<RegisteredAction>,
}

impl VersionedCommand {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            version_template: None,
            actions: Vec::new(),
        }
    }

    /// Parser-level template shared by every version flag that has none of its own
    pub fn version_template(mut self, template: impl Into<String>) -> Self {
        self.version_template = Some(template.into());
        self
    }

    /// Replace the parser-level template after flags were registered
    ///
    /// The template is checked again when a flag is invoked.
    pub fn set_version_template(&mut self, template: impl Into<String>) {
        self.version_template = Some(template.into());
    }

    /// Register a version flag, validating its configuration now
    pub fn add_version_flag(mut self, action: VersionAction) -> std::result::Result<Self, ConfigError> {
        let registered = action.register(self.version_template.as_deref())?;
        debug!("Registered lazy version flag '{}'", registered.id);

        self.command = self
            .command
            .disable_version_flag(true)
            .arg(registered.to_arg());
        self.actions.push(registered);
        Ok(self)
    }

    /// Apply further builder calls to the wrapped command
    pub fn map_command(mut self, f: impl FnOnce(Command) -> Command) -> Self {
        self.command = f(self.command);
        self
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn version_actions(&self) -> &[RegisteredAction] {
        &self.actions
    }

    /// Program name substituted for `%(prog)s`
    pub fn prog(&self) -> &str {
        self.command
            .get_display_name()
            .unwrap_or_else(|| self.command.get_name())
    }

    /// Parse arguments; a version flag yields `Err(Error::DisplayVersion(line))`
    ///
    /// The flag wins over errors clap reports after it (missing required
    /// arguments, later unknown tokens), but not over an unknown token that
    /// comes before it, same as clap's own version flag.
    pub fn try_get_matches_from<I, T>(&self, itr: I) -> Result<ArgMatches>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = itr.into_iter().map(Into::into).collect();

        // A tolerant first pass lets the flag win over missing required arguments
        if !self.actions.is_empty() {
            if let Ok(first_pass) = self
                .command
                .clone()
                .ignore_errors(true)
                .try_get_matches_from(args.iter().cloned())
            {
                self.dispatch(&first_pass)?;
            }
        }

        let matches = self.command.clone().try_get_matches_from(args)?;
        self.dispatch(&matches)?;
        Ok(matches)
    }

    pub fn try_get_matches(&self) -> Result<ArgMatches> {
        self.try_get_matches_from(std::env::args_os())
    }

    /// Parse arguments, printing the version (or the error) and exiting when needed
    pub fn get_matches_from<I, T>(&self, itr: I) -> ArgMatches
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        self.try_get_matches_from(itr).unwrap_or_else(|e| e.exit())
    }

    pub fn get_matches(&self) -> ArgMatches {
        self.get_matches_from(std::env::args_os())
    }

    fn dispatch(&self, matches: &ArgMatches) -> Result<()> {
        let Some(action) = self.actions.iter().find(|a| a.is_present(matches)) else {
            return Ok(());
        };

        debug!("Version flag '{}' passed", action.id);
        let line = action.render(self.prog(), self.version_template.as_deref())?;
        Err(Error::DisplayVersion(line))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::core::error::LookupError;
    use crate::core::metadata::StaticIndex;

    fn shared_index() -> Arc<LazyIndex> {
        Arc::new(LazyIndex::new(|| Ok(StaticIndex::new().with("demo", "1.4.0"))))
    }

    fn parser(action: VersionAction) -> VersionedCommand {
        VersionedCommand::new(Command::new("foo"))
            .add_version_flag(action)
            .unwrap()
    }

    fn display(result: Result<ArgMatches>) -> String {
        match result {
            Err(Error::DisplayVersion(line)) => line,
            other => panic!("expected version output, got {:?}", other),
        }
    }

    #[test]
    fn test_default_template_prints_bare_version() {
        let cmd = parser(
            VersionAction::new("v")
                .short('v')
                .version_from("demo")
                .index(shared_index()),
        );
        assert_eq!(display(cmd.try_get_matches_from(["foo", "-v"])), "1.4.0\n");
    }

    #[test]
    fn test_action_template_overrides_parser() {
        let cmd = VersionedCommand::new(Command::new("foo"))
            .version_template("%(prog)s %(version)s")
            .add_version_flag(
                VersionAction::default()
                    .version_from("demo")
                    .template("v%(version)s")
                    .index(shared_index()),
            )
            .unwrap();
        assert_eq!(
            display(cmd.try_get_matches_from(["foo", "--version"])),
            "v1.4.0\n"
        );
    }

    #[test]
    fn test_flag_absent_returns_matches() {
        let index = shared_index();
        let cmd = parser(
            VersionAction::default()
                .version_from("demo")
                .index(Arc::clone(&index)),
        );
        let matches = cmd.try_get_matches_from(["foo"]).unwrap();
        assert_eq!(matches.get_count("version"), 0);
        assert!(!index.is_initialized());
    }

    #[test]
    fn test_repeated_flag_still_prints() {
        let cmd = parser(
            VersionAction::default()
                .version_from("demo")
                .index(shared_index()),
        );
        assert_eq!(
            display(cmd.try_get_matches_from(["foo", "-V", "-V"])),
            "1.4.0\n"
        );
        assert_eq!(
            display(cmd.try_get_matches_from(["foo", "-V", "--version"])),
            "1.4.0\n"
        );
    }

    #[test]
    fn test_missing_flag_names() {
        let err = VersionedCommand::new(Command::new("foo"))
            .add_version_flag(VersionAction::new("v").version_from("demo"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFlag { .. }));
    }

    #[test]
    fn test_missing_version_from_without_caller() {
        let err = VersionedCommand::new(Command::new("foo"))
            .add_version_flag(VersionAction::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVersionFrom { .. }));
    }

    #[test]
    fn test_parser_template_changed_after_registration() {
        let mut cmd = parser(
            VersionAction::default()
                .version_from("demo")
                .index(shared_index()),
        );
        cmd.set_version_template("no placeholder");

        match cmd.try_get_matches_from(["foo", "-V"]) {
            Err(Error::Config(ConfigError::MissingVersionPlaceholder { template })) => {
                assert_eq!(template, "no placeholder")
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_package() {
        let cmd = parser(
            VersionAction::default()
                .version_from("missing")
                .index(shared_index()),
        );
        match cmd.try_get_matches_from(["foo", "-V"]) {
            Err(Error::Lookup(LookupError::PackageNotFound(name))) => assert_eq!(name, "missing"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_caller_build_time_record_is_default_source() {
        let caller = CallerModule::new("some_tool::cli")
            .with_package(Some("some-tool"), Some("7.0.1"));
        let missing = std::env::temp_dir().join("lazy-version-missing-dir");
        let cmd = parser(VersionAction::default().caller(caller).index_options(IndexOptions {
            search_paths: vec![missing.clone()],
            cargo_home: Some(missing),
            ..Default::default()
        }));

        assert_eq!(display(cmd.try_get_matches_from(["foo", "-V"])), "7.0.1\n");
    }

    #[test]
    fn test_first_matching_flag_wins() {
        let index = shared_index();
        let cmd = VersionedCommand::new(Command::new("foo"))
            .add_version_flag(
                VersionAction::new("short_version")
                    .short('V')
                    .version_from("demo")
                    .index(Arc::clone(&index)),
            )
            .unwrap()
            .add_version_flag(
                VersionAction::new("long_version")
                    .long("version")
                    .version_from("demo")
                    .template("%(prog)s %(version)s")
                    .index(index),
            )
            .unwrap();

        assert_eq!(display(cmd.try_get_matches_from(["foo", "-V"])), "1.4.0\n");
        assert_eq!(
            display(cmd.try_get_matches_from(["foo", "--version"])),
            "foo 1.4.0\n"
        );
    }
}
