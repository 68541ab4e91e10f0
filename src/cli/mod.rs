//! CLI definitions using clap derive API
//!
//! Argument types of each subcommand live in their own submodule.

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_FILE;

pub mod cache;
pub mod completions;
pub mod status;
pub mod sync;

pub use cache::{CacheArgs, CacheSubcommand};
pub use completions::CompletionsArgs;
pub use status::StatusArgs;
pub use sync::SyncArgs;

/// devsync - keep a multi-package workspace checked out, installed and built
#[derive(Parser, Debug)]
#[command(
    name = "devsync",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Keep a multi-package workspace checked out, installed and built",
    long_about = "devsync tracks local and GitHub-hosted packages, checks remote ones out at \
                  the tip of their branch, and reruns npm or pip installs and builds only \
                  when the sources changed since the last successful run.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  devsync sync                     \x1b[90m# Sync every configured package\x1b[0m\n   \
                  devsync sync widgets --jobs 4    \x1b[90m# Sync one package\x1b[0m\n   \
                  devsync status                   \x1b[90m# Show sources and cache state\x1b[0m\n   \
                  devsync cache clear -p widgets   \x1b[90m# Force the next sync to reinstall\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Configuration file
    #[arg(
        long,
        short = 'c',
        global = true,
        env = "DEVSYNC_CONFIG",
        default_value = CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check out, install and build packages
    Sync(SyncArgs),

    /// Show package sources, link state and cache timestamps
    Status(StatusArgs),

    /// Inspect or clear the timestamp cache
    #[command(name = "cache")]
    Cache(CacheArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_sync_defaults() {
        let cli = Cli::try_parse_from(["devsync", "sync"]).unwrap();
        match cli.command {
            Commands::Sync(args) => {
                assert!(args.packages.is_empty());
                assert_eq!(args.jobs, None);
            }
            _ => panic!("Expected Sync command"),
        }
    }

    #[test]
    fn test_cli_parsing_sync_packages_and_jobs() {
        let cli = Cli::try_parse_from(["devsync", "sync", "widgets", "foo", "-j", "3"]).unwrap();
        match cli.command {
            Commands::Sync(args) => {
                assert_eq!(args.packages, vec!["widgets", "foo"]);
                assert_eq!(args.jobs, Some(3));
            }
            _ => panic!("Expected Sync command"),
        }
    }

    #[test]
    fn test_cli_rejects_zero_jobs() {
        assert!(Cli::try_parse_from(["devsync", "sync", "--jobs", "0"]).is_err());
    }

    #[test]
    fn test_cli_parsing_status() {
        let cli = Cli::try_parse_from(["devsync", "status", "--links"]).unwrap();
        match cli.command {
            Commands::Status(args) => {
                assert!(args.links);
                assert!(args.packages.is_empty());
            }
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_cli_parsing_cache_clear() {
        let cli = Cli::try_parse_from(["devsync", "cache", "clear", "--package", "foo"]).unwrap();
        match cli.command {
            Commands::Cache(CacheArgs {
                command: Some(CacheSubcommand::Clear(args)),
            }) => assert_eq!(args.package, Some("foo".to_string())),
            _ => panic!("Expected cache clear command"),
        }
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["devsync", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from(["devsync", "-v", "-c", "/tmp/other.yaml", "status"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("/tmp/other.yaml"));
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::try_parse_from(["devsync", "completions", "bash"]).unwrap();
        match cli.command {
            Commands::Completions(args) => {
                assert_eq!(args.shell, "bash");
            }
            _ => panic!("Expected Completions command"),
        }
    }
}
