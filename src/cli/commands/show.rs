//! Show command implementation

use crate::cli::error::{CliError, CliResult};
use clap::Args;
use lazy_version::{IndexOptions, LazyIndex, MetadataSource, VersionActionConfig, VersionTemplate};
use tracing::debug;

/// Resolve a package's version and print it
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Package name (default: `version_from` in lazy-version.toml)
    pub name: Option<String>,

    /// Percent-style template, e.g. '%(prog)s %(version)s' (default: `version` in lazy-version.toml)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Value substituted for %(prog)s (default: the package name)
    #[arg(long)]
    pub prog: Option<String>,
}

pub fn execute_show(
    args: ShowArgs,
    config: &VersionActionConfig,
    options: IndexOptions,
) -> CliResult<()> {
    let line = render_show(&args, config, &LazyIndex::from_options(options))?;
    println!("{}", line);
    Ok(())
}

/// Resolve the package, template and version; the template is checked before any lookup
pub fn render_show(
    args: &ShowArgs,
    config: &VersionActionConfig,
    index: &dyn MetadataSource,
) -> CliResult<String> {
    let name = args
        .name
        .as_deref()
        .or(config.version_from.as_deref())
        .ok_or_else(|| {
            CliError::Usage(
                "no package given and no version_from in lazy-version.toml".to_string(),
            )
        })?;

    let template = match args.template.as_deref().or(config.version.as_deref()) {
        Some(template) => VersionTemplate::parse(template)?,
        None => VersionTemplate::default(),
    };

    debug!("Showing {} with template {}", name, template);
    let version = index.version(name)?;
    let prog = args.prog.as_deref().unwrap_or(name);
    Ok(template.render(prog, &version))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use lazy_version::{ConfigError, LookupError, StaticIndex};

    fn index() -> StaticIndex {
        StaticIndex::new().with("demo", "0.9.0")
    }

    fn args(name: Option<&str>, template: Option<&str>) -> ShowArgs {
        ShowArgs {
            name: name.map(str::to_string),
            template: template.map(str::to_string),
            prog: None,
        }
    }

    #[test]
    fn test_show_bare_version() {
        let line = render_show(
            &args(Some("demo"), None),
            &VersionActionConfig::default(),
            &index(),
        )
        .unwrap();
        assert_eq!(line, "0.9.0");
    }

    #[test]
    fn test_show_uses_config_defaults() {
        let config = VersionActionConfig {
            version_from: Some("demo".to_string()),
            version: Some("%(prog)s %(version)s".to_string()),
            ..Default::default()
        };
        let line = render_show(&args(None, None), &config, &index()).unwrap();
        assert_eq!(line, "demo 0.9.0");
    }

    #[test]
    fn test_show_without_name() {
        let err = render_show(&args(None, None), &VersionActionConfig::default(), &index())
            .unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn test_show_bad_template_before_lookup() {
        let err = render_show(
            &args(Some("missing"), Some("foo")),
            &VersionActionConfig::default(),
            &index(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ConfigError::MissingVersionPlaceholder { .. })
        ));
    }

    #[test]
    fn test_show_unknown_package() {
        let err = render_show(
            &args(Some("missing"), None),
            &VersionActionConfig::default(),
            &index(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Lookup(LookupError::PackageNotFound(_))
        ));
    }
}
