//! Command modules for CLI

pub mod list;
pub mod show;

use clap::Subcommand;

#[derive(Debug, Subcommand)]
#[command(about = "lazy-version commands")]
pub enum Commands {
    /// Print the version of a package through a percent-style template
    #[command(about = "Resolve a package's version and print it")]
    Show(show::ShowArgs),

    /// List every package the metadata index can see
    #[command(about = "List packages found in manifests and the install record")]
    List(list::ListArgs),
}
