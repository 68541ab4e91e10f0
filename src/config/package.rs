//! Package entries of `devsync.yaml`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{self, Result};

/// One entry under `packages:`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageDescriptor {
    /// Package name, unique within the configuration
    pub name: String,

    /// Directory of a package developed in place
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,

    /// Remote repository and branch to track
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_branch: Option<GithubBranch>,

    /// Whether this package is symlinked into the packages consuming it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_package: Option<bool>,
}

/// Repository identifier (`owner/repo`) and branch of a remote package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GithubBranch {
    pub repository: String,
    pub branch: String,
}

/// Where a package's source lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageSource<'a> {
    Local(&'a Path),
    Remote(&'a GithubBranch),
}

impl PackageDescriptor {
    /// Descriptor for a package developed in a local directory
    #[allow(dead_code)] // used in tests
    pub fn local(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            local_path: Some(path.into()),
            github_branch: None,
            link_package: None,
        }
    }

    /// Descriptor for a package tracked from `repository` at `branch`
    #[allow(dead_code)] // used in tests
    pub fn remote(
        name: impl Into<String>,
        repository: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            local_path: None,
            github_branch: Some(GithubBranch {
                repository: repository.into(),
                branch: branch.into(),
            }),
            link_package: None,
        }
    }

    /// Resolve which source this descriptor declares.
    ///
    /// Exactly one of `local_path` and `github_branch` must be set.
    pub fn source(&self) -> Result<PackageSource<'_>> {
        match (&self.local_path, &self.github_branch) {
            (Some(path), None) => Ok(PackageSource::Local(path)),
            (None, Some(remote)) => Ok(PackageSource::Remote(remote)),
            (Some(_), Some(_)) => Err(error::config::invalid(format!(
                "package '{}' sets both local_path and github_branch",
                self.name
            ))),
            (None, None) => Err(error::config::invalid(format!(
                "package '{}' needs either local_path or github_branch",
                self.name
            ))),
        }
    }

    pub fn is_local(&self) -> bool {
        self.local_path.is_some()
    }

    /// True unless the configuration sets `link_package: false`
    pub fn shall_be_linked(&self) -> bool {
        self.link_package != Some(false)
    }
}

impl GithubBranch {
    /// Split the repository identifier into owner and repository name.
    pub fn owner_and_name(&self) -> Result<(&str, &str)> {
        match self.repository.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok((owner, name))
            }
            _ => Err(error::config::invalid(format!(
                "repository '{}' must have the form <owner>/<repo>",
                self.repository
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_source() {
        let pkg = PackageDescriptor::local("foo", "/ws/foo");
        assert!(pkg.is_local());
        assert_eq!(pkg.source().unwrap(), PackageSource::Local(Path::new("/ws/foo")));
    }

    #[test]
    fn test_remote_source() {
        let pkg = PackageDescriptor::remote("widgets", "acme/widgets", "main");
        assert!(!pkg.is_local());
        match pkg.source().unwrap() {
            PackageSource::Remote(remote) => {
                assert_eq!(remote.repository, "acme/widgets");
                assert_eq!(remote.branch, "main");
            }
            PackageSource::Local(_) => panic!("expected remote source"),
        }
    }

    #[test]
    fn test_source_requires_exactly_one() {
        let mut pkg = PackageDescriptor::local("foo", "/ws/foo");
        pkg.github_branch = Some(GithubBranch {
            repository: "acme/foo".to_string(),
            branch: "main".to_string(),
        });
        assert!(pkg.source().is_err());

        pkg.local_path = None;
        pkg.github_branch = None;
        assert!(pkg.source().is_err());
    }

    #[test]
    fn test_shall_be_linked_defaults_to_true() {
        let mut pkg = PackageDescriptor::local("foo", "/ws/foo");
        assert!(pkg.shall_be_linked());

        pkg.link_package = Some(true);
        assert!(pkg.shall_be_linked());

        pkg.link_package = Some(false);
        assert!(!pkg.shall_be_linked());
    }

    #[test]
    fn test_owner_and_name() {
        let remote = GithubBranch {
            repository: "acme/widgets".to_string(),
            branch: "main".to_string(),
        };
        assert_eq!(remote.owner_and_name().unwrap(), ("acme", "widgets"));

        for bad in ["widgets", "/widgets", "acme/", "acme/widgets/extra"] {
            let remote = GithubBranch {
                repository: bad.to_string(),
                branch: "main".to_string(),
            };
            assert!(remote.owner_and_name().is_err(), "{bad} should be rejected");
        }
    }
}
