//! devsync - workspace package synchronizer
//!
//! Keeps a set of local and GitHub-hosted development packages checked out,
//! installed and built, rerunning each step only when something changed.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cache;
mod cli;
mod commands;
mod config;
mod error;
mod exec;
mod git;
mod package;
mod path_utils;
mod progress;
mod sync;

use cli::{Cli, Commands};

/// Log to stderr; `RUST_LOG` overrides the level picked by `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "devsync=debug" } else { "devsync=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Sync(args) => commands::sync::run(&cli.config, args),
        Commands::Status(args) => commands::status::run(&cli.config, args),
        Commands::Cache(args) => commands::cache::run(args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
