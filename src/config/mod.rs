//! Configuration file handling for devsync
//!
//! `devsync.yaml` declares the packages of a workspace and where remote
//! packages are checked out:
//!
//! ```yaml
//! repo_storage_directory: ~/.devsync/repos
//! packages:
//!   - name: widgets
//!     github_branch: { repository: acme/widgets, branch: main }
//!   - name: foo
//!     local_path: /ws/foo
//!     link_package: false
//! ```

pub mod package;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};
use crate::path_utils;

pub use package::{GithubBranch, PackageDescriptor, PackageSource};

/// Default configuration file name, looked up in the current directory
pub const CONFIG_FILE: &str = "devsync.yaml";

/// Environment variable consulted when no token is configured
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

const DEFAULT_GITHUB_BASE_URL: &str = "https://github.com";
const DEFAULT_NETWORK_TIMEOUT_SECS: u64 = 600;
const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 1800;

/// Parsed `devsync.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Parent directory of remote package checkouts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_storage_directory: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_access_token: Option<String>,

    /// Prefix of clone URLs, `<base>/<owner>/<repo>.git`
    #[serde(default = "default_github_base_url")]
    pub github_base_url: String,

    /// Python interpreter used for editable installs
    #[serde(default = "default_python")]
    pub python: String,

    #[serde(default = "default_npm")]
    pub npm: String,

    /// Number of package pipelines run concurrently
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    #[serde(default = "default_network_timeout_secs")]
    pub network_timeout_secs: u64,

    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    #[serde(default)]
    pub packages: Vec<PackageDescriptor>,
}

fn default_github_base_url() -> String {
    DEFAULT_GITHUB_BASE_URL.to_string()
}

fn default_python() -> String {
    if cfg!(windows) { "python" } else { "python3" }.to_string()
}

fn default_npm() -> String {
    "npm".to_string()
}

fn default_jobs() -> usize {
    1
}

fn default_network_timeout_secs() -> u64 {
    DEFAULT_NETWORK_TIMEOUT_SECS
}

fn default_command_timeout_secs() -> u64 {
    DEFAULT_COMMAND_TIMEOUT_SECS
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            repo_storage_directory: None,
            github_access_token: None,
            github_base_url: default_github_base_url(),
            python: default_python(),
            npm: default_npm(),
            jobs: default_jobs(),
            network_timeout_secs: default_network_timeout_secs(),
            command_timeout_secs: default_command_timeout_secs(),
            packages: Vec::new(),
        }
    }
}

impl SyncConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(error::config::not_found(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| error::fs::read_failed(path.display().to_string(), e.to_string()))?;
        let mut config = Self::from_yaml(&content).map_err(|e| match e {
            crate::error::SyncError::ConfigParseFailed { reason, .. } => {
                error::config::parse_failed(path.display().to_string(), reason)
            }
            other => other,
        })?;
        if let Some(base) = path.parent() {
            config.anchor_relative_paths(base);
        }
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let mut config: Self = serde_yaml::from_str(yaml)?;
        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    fn expand_paths(&mut self) {
        if let Some(dir) = &self.repo_storage_directory {
            self.repo_storage_directory = Some(path_utils::expand_home(dir));
        }
        for package in &mut self.packages {
            if let Some(path) = &package.local_path {
                package.local_path = Some(path_utils::expand_home(path));
            }
        }
    }

    /// Make relative paths relative to `base`, the configuration file's directory
    fn anchor_relative_paths(&mut self, base: &Path) {
        if let Some(dir) = &self.repo_storage_directory {
            if dir.is_relative() {
                self.repo_storage_directory = Some(base.join(dir));
            }
        }
        for package in &mut self.packages {
            if let Some(path) = &package.local_path {
                if path.is_relative() {
                    package.local_path = Some(base.join(path));
                }
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for package in &self.packages {
            if package.name.trim().is_empty() {
                return Err(error::config::invalid("package names must not be empty"));
            }
            if is_unsafe_name(&package.name) {
                return Err(error::config::invalid(format!(
                    "package name '{}' must not contain path separators or be '.' or '..'",
                    package.name
                )));
            }
            if !seen.insert(package.name.as_str()) {
                return Err(error::config::invalid(format!(
                    "package '{}' is declared more than once",
                    package.name
                )));
            }
            if let PackageSource::Remote(remote) = package.source()? {
                remote.owner_and_name()?;
            }
        }
        if self.jobs == 0 {
            return Err(error::config::invalid("jobs must be at least 1"));
        }
        Ok(())
    }

    /// Look up a package by name
    pub fn get_package(&self, name: &str) -> Result<&PackageDescriptor> {
        self.packages
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| error::config::package_not_configured(name))
    }

    /// Configured token, falling back to `$GITHUB_TOKEN`
    pub fn github_token(&self) -> Option<String> {
        self.github_access_token
            .clone()
            .or_else(|| std::env::var(GITHUB_TOKEN_ENV).ok())
            .filter(|t| !t.is_empty())
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// Names become directories under the storage directory
fn is_unsafe_name(name: &str) -> bool {
    name == "." || name == ".." || name.contains(['/', '\\'])
}
