//! Sync command implementation

use std::path::Path;

use crate::cache::Cache;
use crate::cli::SyncArgs;
use crate::config::SyncConfig;
use crate::error::{Result, SyncError};
use crate::git::GithubResolver;
use crate::package::SyncContext;
use crate::progress::SyncProgress;
use crate::sync;

/// Run sync command
pub fn run(config_path: &Path, args: SyncArgs) -> Result<()> {
    let config = SyncConfig::load(config_path)?;
    let cache = Cache::open_default()?;
    let resolver = GithubResolver::new(config.github_base_url.clone());
    let ctx = SyncContext::new(&config, &cache, &resolver);

    let names = sync::select_packages(&ctx, &args.packages);
    if names.is_empty() {
        println!("No packages configured.");
        return Ok(());
    }
    let jobs = args.jobs.map_or(config.jobs, usize::from);

    let progress = SyncProgress::new(names.len() as u64);
    let reports = sync::run(&ctx, &names, jobs, |report| progress.finish_package(report));
    progress.finish();

    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        return Err(SyncError::SyncFailed {
            failed,
            total: reports.len(),
        });
    }

    println!(
        "Synced {} package{}.",
        reports.len(),
        if reports.len() == 1 { "" } else { "s" }
    );
    Ok(())
}
