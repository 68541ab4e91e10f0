use clap::Parser;

/// Arguments for sync command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Sync every configured package:\n    devsync sync\n\n\
                  Sync selected packages:\n    devsync sync widgets foo\n\n\
                  Run four packages at a time:\n    devsync sync --jobs 4")]
pub struct SyncArgs {
    /// Packages to sync (defaults to all configured packages)
    pub packages: Vec<String>,

    /// Number of packages synced concurrently (overrides `jobs` in the config)
    #[arg(long, short = 'j', value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,
}
