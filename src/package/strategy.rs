//! Install and build routines per package kind
//!
//! A package with a `react/` directory is built with npm; every other
//! package is installed into the Python environment in editable mode and has
//! no build step.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::{self, Result};
use crate::exec::Toolchain;

/// Directory holding the npm project of a node package
pub const FRONTEND_DIR: &str = "react";

/// Kind name of packages built with npm
pub const NODE_KIND: &str = "node";

/// Directories whose contents never count as build input
const IGNORED_DIRS: &[&str] = &["node_modules", "dist", "build"];

/// Kind-specific actions the lifecycle delegates to
pub trait PackageStrategy: Send + Sync {
    /// Short name for messages
    fn kind(&self) -> &'static str;

    fn install_routine(&self, path: &Path) -> Result<()>;

    fn build_routine(&self, path: &Path) -> Result<()>;

    /// Newest time the build inputs changed.
    ///
    /// Kinds without a build step return the Unix epoch, which no stored
    /// build time is older than.
    fn build_timestamp(&self, path: &Path) -> Result<SystemTime>;

    /// Directory the package manager treats as the project root
    fn manifest_dir(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// Pick the strategy for the package at `path`
pub fn strategy_for(path: &Path, toolchain: &Toolchain) -> Box<dyn PackageStrategy> {
    if path.join(FRONTEND_DIR).is_dir() {
        Box::new(NodePackage::new(toolchain.clone()))
    } else {
        Box::new(PythonPackage::new(toolchain.clone()))
    }
}

/// Package with an npm project under `react/`
#[derive(Debug, Clone)]
pub struct NodePackage {
    toolchain: Toolchain,
}

impl NodePackage {
    pub fn new(toolchain: Toolchain) -> Self {
        Self { toolchain }
    }
}

impl PackageStrategy for NodePackage {
    fn kind(&self) -> &'static str {
        NODE_KIND
    }

    fn install_routine(&self, path: &Path) -> Result<()> {
        let dir = self.manifest_dir(path);
        let args: &[&str] = if dir.join("package-lock.json").is_file() {
            &["ci"]
        } else {
            &["install"]
        };
        self.toolchain.npm(args, &dir)?;
        Ok(())
    }

    fn build_routine(&self, path: &Path) -> Result<()> {
        self.toolchain.npm(&["run", "build"], &self.manifest_dir(path))?;
        Ok(())
    }

    fn build_timestamp(&self, path: &Path) -> Result<SystemTime> {
        newest_source_mtime(&self.manifest_dir(path))
    }

    fn manifest_dir(&self, path: &Path) -> PathBuf {
        path.join(FRONTEND_DIR)
    }
}

/// Python package installed with `pip install -e`
#[derive(Debug, Clone)]
pub struct PythonPackage {
    toolchain: Toolchain,
}

impl PythonPackage {
    pub fn new(toolchain: Toolchain) -> Self {
        Self { toolchain }
    }
}

impl PackageStrategy for PythonPackage {
    fn kind(&self) -> &'static str {
        "python"
    }

    fn install_routine(&self, path: &Path) -> Result<()> {
        self.toolchain
            .python(&["-m", "pip", "install", "--editable", "."], path)?;
        Ok(())
    }

    fn build_routine(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn build_timestamp(&self, _path: &Path) -> Result<SystemTime> {
        Ok(SystemTime::UNIX_EPOCH)
    }
}

fn is_ignored(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || IGNORED_DIRS.contains(&&*name)
}

/// Newest file mtime under `dir`, skipping dependencies and build output
pub fn newest_source_mtime(dir: &Path) -> Result<SystemTime> {
    let mut newest = SystemTime::UNIX_EPOCH;
    for entry in WalkDir::new(dir).into_iter().filter_entry(|e| !is_ignored(e)) {
        let entry = entry
            .map_err(|e| error::fs::read_failed(dir.display().to_string(), e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let modified = entry
            .metadata()
            .map_err(|e| error::fs::read_failed(entry.path().display().to_string(), e.to_string()))?
            .modified()?;
        newest = newest.max(modified);
    }
    debug!(dir = %dir.display(), ?newest, "newest build input");
    Ok(newest)
}
