//! Cache keys and records

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Identity of a cached package.
///
/// A local and a remote package of the same name are tracked separately.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub name: String,
    pub is_local: bool,
}

impl CacheKey {
    pub fn new(name: impl Into<String>, is_local: bool) -> Self {
        Self {
            name: name.into(),
            is_local,
        }
    }

    /// Parse the on-disk form `<name>:local` / `<name>:remote`
    pub fn parse(key: &str) -> Option<Self> {
        let (name, kind) = key.rsplit_once(':')?;
        let is_local = match kind {
            "local" => true,
            "remote" => false,
            _ => return None,
        };
        Some(Self::new(name, is_local))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_local { "local" } else { "remote" };
        write!(f, "{}:{}", self.name, kind)
    }
}

/// Timestamps recorded for one package.
///
/// Every field defaults to the Unix epoch, which sorts before any real
/// modification time, so a package never synced before always runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// Time of the last install, compared against the package directory mtime
    #[serde(default = "epoch")]
    pub modified_at: SystemTime,
    #[serde(default = "epoch")]
    pub installed_at: SystemTime,
    #[serde(default = "epoch")]
    pub built_at: SystemTime,
}

fn epoch() -> SystemTime {
    SystemTime::UNIX_EPOCH
}

impl Default for CacheRecord {
    fn default() -> Self {
        Self {
            modified_at: epoch(),
            installed_at: epoch(),
            built_at: epoch(),
        }
    }
}
