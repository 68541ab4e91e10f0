//! Status command implementation
//!
//! Shows where each package lives, whether it should be and is linked, and
//! what the cache remembers about it. Nothing is checked out or installed.

use std::path::Path;
use std::time::SystemTime;

use console::{Style, StyledObject};

use crate::cache::Cache;
use crate::cli::StatusArgs;
use crate::commands::helpers::format_age;
use crate::config::{PackageSource, SyncConfig};
use crate::error::Result;
use crate::git::{GithubResolver, redact_url};
use crate::package::strategy::NODE_KIND;
use crate::package::{Package, SyncContext};
use crate::path_utils::to_forward_slashes;
use crate::sync::select_packages;

/// Run status command
pub fn run(config_path: &Path, args: StatusArgs) -> Result<()> {
    let config = SyncConfig::load(config_path)?;
    let cache = Cache::open_default()?;
    let resolver = GithubResolver::new(config.github_base_url.clone());
    let ctx = SyncContext::new(&config, &cache, &resolver);

    let names = select_packages(&ctx, &args.packages);
    if names.is_empty() {
        println!("No packages configured.");
        return Ok(());
    }

    let now = SystemTime::now();
    for name in &names {
        let package = Package::locate(name, &ctx)?;
        display_package(&ctx, &package, args.links, now)?;
        println!();
    }
    Ok(())
}

fn link_state(result: Result<bool>) -> StyledObject<String> {
    match result {
        Ok(true) => Style::new().green().apply_to("yes".to_string()),
        Ok(false) => Style::new().dim().apply_to("no".to_string()),
        Err(e) => Style::new().red().apply_to(format!("unknown ({e})")),
    }
}

/// Whether a node package's dependencies resolve every other linkable
/// package to its workspace directory
fn display_dependency_links(ctx: &SyncContext<'_>, package: &Package<'_>) {
    let others: Vec<&str> = ctx
        .config
        .packages
        .iter()
        .filter(|d| d.name != package.name() && d.shall_be_linked())
        .map(|d| d.name.as_str())
        .collect();
    if others.is_empty() {
        return;
    }

    println!("  {}", Style::new().bold().apply_to("Linked to:"));
    for name in others {
        let linked = Package::locate(name, ctx).and_then(|other| {
            package.is_linked_to(name, &to_forward_slashes(&other.manifest_dir()))
        });
        println!("    {}: {}", name, link_state(linked));
    }
}

fn display_package(
    ctx: &SyncContext<'_>,
    package: &Package<'_>,
    query_links: bool,
    now: SystemTime,
) -> Result<()> {
    let bold = Style::new().bold();
    let descriptor = ctx.config.get_package(package.name())?;

    println!("{}", Style::new().bold().yellow().apply_to(package.name()));
    match descriptor.source()? {
        PackageSource::Local(_) => println!("  {} local", bold.apply_to("Source:")),
        PackageSource::Remote(remote) => println!(
            "  {} {}@{}",
            bold.apply_to("Source:"),
            remote.repository,
            remote.branch
        ),
    }
    if let Some(binding) = package.binding() {
        println!(
            "  {} {} ({})",
            bold.apply_to("Tracks:"),
            binding.git_ref(),
            redact_url(&binding.clone_url)
        );
    }

    let exists = package.path().is_dir();
    println!(
        "  {} {}{}",
        bold.apply_to("Path:"),
        package.path().display(),
        if exists {
            String::new()
        } else {
            Style::new().red().apply_to(" (missing)").to_string()
        }
    );
    if exists {
        println!("  {} {}", bold.apply_to("Kind:"), package.kind());
    }

    println!(
        "  {} {}",
        bold.apply_to("Link:"),
        if package.shall_be_linked() { "yes" } else { "no" }
    );
    if query_links && exists {
        println!(
            "  {} {}",
            bold.apply_to("Linked:"),
            link_state(package.is_linked())
        );
        if package.kind() == NODE_KIND {
            display_dependency_links(ctx, package);
        }
    }

    let (name, is_local) = (package.name(), package.is_local());
    println!(
        "  {} {}",
        bold.apply_to("Seen:"),
        format_age(ctx.cache.modified_timestamp(name, is_local), now)
    );
    println!(
        "  {} {}",
        bold.apply_to("Installed:"),
        format_age(ctx.cache.installed_timestamp(name, is_local), now)
    );
    println!(
        "  {} {}",
        bold.apply_to("Built:"),
        format_age(ctx.cache.built_timestamp(name, is_local), now)
    );
    Ok(())
}
