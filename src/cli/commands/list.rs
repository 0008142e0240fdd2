//! List command implementation

use crate::cli::error::CliResult;
use clap::Args;
use lazy_version::{Distribution, IndexOptions, MetadataSource};

/// List packages found in manifests and the install record
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Also print where each record was found
    #[arg(long)]
    pub origin: bool,
}

pub fn execute_list(args: ListArgs, options: IndexOptions) -> CliResult<()> {
    let index = options.build()?;
    let distributions = index.distributions();

    if distributions.is_empty() {
        println!("No packages found");
        return Ok(());
    }

    for line in format_distributions(&distributions, args.origin) {
        println!("{}", line);
    }
    Ok(())
}

/// One aligned `name  version[  origin]` line per distribution, sorted by name
pub fn format_distributions(distributions: &[Distribution], with_origin: bool) -> Vec<String> {
    let mut sorted: Vec<&Distribution> = distributions.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    let width = sorted.iter().map(|d| d.name.len()).max().unwrap_or(0);
    sorted
        .into_iter()
        .map(|dist| {
            if with_origin {
                format!("{:<width$}  {}  {}", dist.name, dist.version, dist.origin)
            } else {
                format!("{:<width$}  {}", dist.name, dist.version)
            }
        })
        .collect()
}
