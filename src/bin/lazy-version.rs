//! lazy-version CLI binary entry point

#[path = "../cli/mod.rs"]
mod cli;

use cli::Cli;

fn main() {
    // `--version` is answered (and the process exits) inside parsing
    let cli = match Cli::parse_from_env() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = cli.execute() {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
