use std::time::SystemTime;

use console::Style;

use crate::cache::Cache;
use crate::cli::{CacheArgs, CacheSubcommand};
use crate::commands::helpers::format_age;
use crate::error::Result;

pub fn run(args: CacheArgs) -> Result<()> {
    let cache = Cache::open_default()?;

    match args.command {
        Some(CacheSubcommand::List) => list_records(&cache),
        Some(CacheSubcommand::Clear(clear_args)) => match clear_args.package {
            Some(name) => clear_package(&cache, &name),
            None => clear_all(&cache),
        },
        None => show_cache_info(&cache),
    }
}

fn show_cache_info(cache: &Cache) -> Result<()> {
    let count = cache.entries().len();

    println!("Cache:");
    println!("  Location: {}", cache.path().display());
    println!("  Records: {count}");

    if count == 0 {
        println!("\nCache is empty.");
    } else {
        println!("\nRun 'devsync cache list' to list recorded timestamps.");
        println!("Run 'devsync cache clear' to forget every package.");
        println!("Run 'devsync cache clear --package <name>' to forget one package.");
    }
    Ok(())
}

fn list_records(cache: &Cache) -> Result<()> {
    let entries = cache.entries();
    if entries.is_empty() {
        println!("No cached packages.");
        return Ok(());
    }

    let now = SystemTime::now();
    println!("Cached packages ({}):", entries.len());
    for (key, record) in &entries {
        println!(
            "  {} ({})",
            Style::new().bold().yellow().apply_to(&key.name),
            if key.is_local { "local" } else { "remote" }
        );
        println!("    Modified: {}", format_age(record.modified_at, now));
        println!("    Installed: {}", format_age(record.installed_at, now));
        println!("    Built: {}", format_age(record.built_at, now));
    }
    Ok(())
}

fn clear_all(cache: &Cache) -> Result<()> {
    cache.clear()?;
    println!("Cache cleared successfully.");
    Ok(())
}

fn clear_package(cache: &Cache, name: &str) -> Result<()> {
    match cache.remove(name, None)? {
        0 => println!("No cached records for '{name}'."),
        n => println!(
            "Removed {n} cached record{} for '{name}'.",
            if n == 1 { "" } else { "s" }
        ),
    }
    Ok(())
}
