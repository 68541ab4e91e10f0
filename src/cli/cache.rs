use clap::{Parser, Subcommand};

/// Arguments for cache command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show cache location:\n    devsync cache\n\n\
                  List recorded timestamps:\n    devsync cache list\n\n\
                  Forget everything:\n    devsync cache clear\n\n\
                  Forget one package:\n    devsync cache clear --package widgets")]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: Option<CacheSubcommand>,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// List recorded timestamps
    List,

    /// Clear recorded timestamps
    Clear(ClearCacheArgs),
}

/// Arguments for cache clear command
#[derive(Parser, Debug)]
pub struct ClearCacheArgs {
    /// Remove only the records of this package
    #[arg(long, short = 'p')]
    pub package: Option<String>,
}
