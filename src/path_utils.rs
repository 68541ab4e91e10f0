//! Cross-platform path utilities for devsync
//!
//! Package-manager listings print paths with platform separators and
//! sometimes a trailing separator, so matching against them goes through
//! these helpers.

use std::path::{Path, PathBuf};

/// Convert a path to a string with forward slashes.
pub fn to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Strip one trailing `/` or `\` from a path string.
///
/// A bare root (`/`) is left as-is.
pub fn strip_trailing_separator(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix(['/', '\\']).unwrap_or(path)
    } else {
        path
    }
}

/// Expand a leading `~` to the user's home directory.
///
/// Paths without a leading `~`, or when no home directory can be found,
/// are returned unchanged.
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}
