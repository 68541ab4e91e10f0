//! Stale editable-install markers
//!
//! An older `pip install -e` leaves `<name>.egg-link` files on the
//! interpreter's search path that shadow a fresh install. Removing them is
//! best effort: failures are logged and the install goes on.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::exec::Toolchain;

const SEARCH_PATH_SCRIPT: &str = "import sys\nfor p in sys.path:\n    if p: print(p)";

/// Directories on the Python interpreter's `sys.path`
pub fn search_path(toolchain: &Toolchain, cwd: &Path) -> Result<Vec<PathBuf>> {
    let output = toolchain.python(&["-c", SEARCH_PATH_SCRIPT], cwd)?;
    Ok(output
        .stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// `<name>.egg-link` files present in any of `dirs`
pub fn find_markers(dirs: &[PathBuf], name: &str) -> Vec<PathBuf> {
    let file_name = format!("{name}.egg-link");
    dirs.iter()
        .map(|dir| dir.join(&file_name))
        .filter(|marker| marker.is_file())
        .collect()
}

/// Remove stale markers for `name`; never fails
pub fn remove_stale_markers(toolchain: &Toolchain, name: &str, cwd: &Path) {
    let dirs = match search_path(toolchain, cwd) {
        Ok(dirs) => dirs,
        Err(e) => {
            debug!(package = name, error = %e, "skipping editable-install check");
            return;
        }
    };

    for marker in find_markers(&dirs, name) {
        match fs::remove_file(&marker) {
            Ok(()) => info!(package = name, marker = %marker.display(), "removed stale egg-link"),
            Err(e) => warn!(
                package = name,
                marker = %marker.display(),
                error = %e,
                "could not remove stale egg-link"
            ),
        }
    }
}
