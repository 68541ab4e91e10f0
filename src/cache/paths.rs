//! Cache path utilities and constants

use std::path::PathBuf;

use crate::error::{self, Result};

/// Default cache directory name under user's cache directory
const CACHE_DIR: &str = "devsync";

/// Environment variable overriding the cache directory
pub const CACHE_DIR_ENV: &str = "DEVSYNC_CACHE_DIR";

/// Timestamp store file name within the cache directory
pub const TIMESTAMPS_FILE: &str = "timestamps.json";

/// Get the default cache directory path
///
/// Uses the platform's standard cache location (e.g. XDG on Linux, Library/Caches on macOS)
/// with a `devsync` subdirectory. Can be overridden with the `DEVSYNC_CACHE_DIR` environment variable.
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(cache_dir) = std::env::var(CACHE_DIR_ENV) {
        return Ok(PathBuf::from(cache_dir));
    }

    let base = dirs::cache_dir()
        .ok_or_else(|| error::cache::operation_failed("Could not determine cache directory"))?;

    Ok(base.join(CACHE_DIR))
}
