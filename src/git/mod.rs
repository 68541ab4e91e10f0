//! Git operations for remote packages
//!
//! This module converges a local directory onto the tip of a tracked remote
//! branch. Running [`RepositorySynchronizer::checkout`] repeatedly is safe:
//!
//! 1. An existing working tree is reused. Its remote named after the
//!    repository owner is kept, or added if missing.
//! 2. A missing or empty directory is cloned into, and the default `origin`
//!    remote is renamed after the repository owner.
//! 3. That remote is fetched and `<owner>/<branch>` is checked out.
//!
//! Authentication uses a configured access token when present, otherwise
//! git's native credential system (SSH keys, credential helpers, etc.).

mod auth;
mod checkout;
mod clone;
mod error;
pub mod url;

use std::cell::Cell;
use std::path::Path;
use std::time::{Duration, Instant};

use git2::{AutotagOption, ErrorCode, FetchOptions, FetchPrune, RemoteCallbacks, Repository};
use tracing::{debug, info, warn};

use crate::config::GithubBranch;
use crate::error::Result;

pub use checkout::open_working_tree;
pub use url::{CloneUrlResolver, GithubResolver, redact_url};

/// Name libgit2 gives the remote of a fresh clone
const DEFAULT_REMOTE: &str = "origin";

/// A remote package's remote name, clone URL and branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryBinding {
    /// Owner part of `owner/repo`; also the git remote name
    pub remote_name: String,
    pub clone_url: String,
    pub branch: String,
}

impl RepositoryBinding {
    pub fn new(remote: &GithubBranch, clone_url: impl Into<String>) -> Result<Self> {
        let (owner, _) = remote.owner_and_name()?;
        Ok(Self {
            remote_name: owner.to_string(),
            clone_url: clone_url.into(),
            branch: remote.branch.clone(),
        })
    }

    /// `<remote>/<branch>`, the ref the working tree is checked out at
    pub fn git_ref(&self) -> String {
        format!("{}/{}", self.remote_name, self.branch)
    }
}

/// What a checkout had to do besides fetching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    pub binding: RepositoryBinding,
    /// Commit the working tree is at
    pub commit: String,
    /// The directory was cloned into
    pub cloned: bool,
    /// An existing working tree got the remote added
    pub remote_added: bool,
}

/// Converges local directories onto remote branch tips
pub struct RepositorySynchronizer<'a> {
    resolver: &'a dyn CloneUrlResolver,
    token: Option<String>,
    network_timeout: Duration,
}

impl<'a> RepositorySynchronizer<'a> {
    pub fn new(resolver: &'a dyn CloneUrlResolver) -> Self {
        Self {
            resolver,
            token: None,
            network_timeout: Duration::from_secs(600),
        }
    }

    /// Offer `token` to HTTPS remotes
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Abort clone and fetch once `timeout` has elapsed
    #[must_use]
    pub fn with_network_timeout(mut self, timeout: Duration) -> Self {
        self.network_timeout = timeout;
        self
    }

    /// Make `local_path` a working tree at the tip of `remote`'s branch
    pub fn checkout(&self, remote: &GithubBranch, local_path: &Path) -> Result<CheckoutOutcome> {
        let clone_url = self.resolver.clone_url(&remote.repository)?;
        let binding = RepositoryBinding::new(remote, clone_url)?;

        let (repo, cloned, remote_added) = match open_working_tree(local_path)? {
            Some(repo) => {
                let added = ensure_remote(&repo, &binding)?;
                (repo, false, added)
            }
            None => (self.clone_into(&binding, local_path)?, true, false),
        };

        self.fetch(&repo, &binding.remote_name)?;

        let commit = checkout::checkout_remote_branch(&repo, &binding.remote_name, &binding.branch)?;
        info!(
            git_ref = %binding.git_ref(),
            commit = %commit,
            path = %local_path.display(),
            "checked out"
        );

        Ok(CheckoutOutcome {
            binding,
            commit: commit.to_string(),
            cloned,
            remote_added,
        })
    }

    fn clone_into(&self, binding: &RepositoryBinding, local_path: &Path) -> Result<Repository> {
        info!(url = %redact_url(&binding.clone_url), path = %local_path.display(), "cloning");
        let transfer = Transfer::new(self.network_timeout);
        let repo = clone::clone(
            &binding.clone_url,
            local_path,
            transfer.fetch_options(self.token.as_deref()),
        )
        .map_err(|e| transfer.explain(e, |reason| {
            crate::error::git::clone_failed(redact_url(&binding.clone_url), reason)
        }))?;

        if binding.remote_name != DEFAULT_REMOTE {
            let problems = repo.remote_rename(DEFAULT_REMOTE, &binding.remote_name)?;
            for problem in problems.iter().flatten() {
                warn!(refspec = problem, "refspec was not renamed");
            }
        }
        Ok(repo)
    }

    fn fetch(&self, repo: &Repository, remote_name: &str) -> Result<()> {
        debug!(remote = remote_name, "fetching");
        let mut remote = repo
            .find_remote(remote_name)
            .map_err(|e| crate::error::git::fetch_failed(remote_name, e.message()))?;

        let transfer = Transfer::new(self.network_timeout);
        let mut options = transfer.fetch_options(self.token.as_deref());
        remote
            .fetch(&[] as &[&str], Some(&mut options), None)
            .map_err(|e| {
                let reason = error::interpret_git_error(&e);
                transfer.explain(
                    crate::error::git::fetch_failed(remote_name, reason),
                    |reason| crate::error::git::fetch_failed(remote_name, reason),
                )
            })
    }
}

/// Add the binding's remote to `repo` unless one of that name exists.
///
/// An existing remote keeps its URL even when it differs from the resolved
/// clone URL. Returns whether the remote was added.
fn ensure_remote(repo: &Repository, binding: &RepositoryBinding) -> Result<bool> {
    match repo.find_remote(&binding.remote_name) {
        Ok(remote) => {
            if remote.url() != Some(binding.clone_url.as_str()) {
                warn!(
                    remote = %binding.remote_name,
                    configured = %redact_url(remote.url().unwrap_or_default()),
                    resolved = %redact_url(&binding.clone_url),
                    "existing remote points elsewhere; keeping it"
                );
            }
            Ok(false)
        }
        Err(e) if e.code() == ErrorCode::NotFound => {
            info!(remote = %binding.remote_name, "adding remote");
            repo.remote(&binding.remote_name, &binding.clone_url)?;
            Ok(true)
        }
        Err(e) => Err(e.into()),
    }
}

/// Per-operation transfer state: deadline and credential attempts
struct Transfer {
    deadline: Instant,
    timeout: Duration,
    timed_out: Cell<bool>,
    auth_attempts: Cell<u32>,
}

impl Transfer {
    fn new(timeout: Duration) -> Self {
        Self {
            deadline: Instant::now() + timeout,
            timeout,
            timed_out: Cell::new(false),
            auth_attempts: Cell::new(0),
        }
    }

    fn fetch_options<'a>(&'a self, token: Option<&'a str>) -> FetchOptions<'a> {
        let mut callbacks = RemoteCallbacks::new();
        auth::setup_auth_callbacks(&mut callbacks, token, &self.auth_attempts);
        callbacks.transfer_progress(move |_| self.within_deadline());
        callbacks.sideband_progress(move |_| self.within_deadline());

        let mut options = FetchOptions::new();
        options.remote_callbacks(callbacks);
        options.prune(FetchPrune::On);
        options.download_tags(AutotagOption::Auto);
        options
    }

    fn within_deadline(&self) -> bool {
        if Instant::now() < self.deadline {
            true
        } else {
            self.timed_out.set(true);
            false
        }
    }

    /// Replace `err` with a timeout message when the deadline aborted the transfer
    fn explain(
        &self,
        err: crate::error::SyncError,
        rebuild: impl FnOnce(String) -> crate::error::SyncError,
    ) -> crate::error::SyncError {
        if self.timed_out.get() {
            rebuild(format!("timed out after {} seconds", self.timeout.as_secs()))
        } else {
            err
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::fs;
    use std::path::{Path, PathBuf};

    use git2::{Commit, Oid, Repository, Signature};

    use super::*;
    use crate::error::Result;

    /// Resolves every repository to `file://<root>/<owner>/<repo>.git`
    pub fn file_resolver(root: &Path) -> GithubResolver {
        GithubResolver::new(format!("file://{}", root.display()))
    }

    /// Create a non-bare upstream repository at `<root>/<repository>.git`
    pub fn init_upstream(root: &Path, repository: &str) -> (PathBuf, Repository) {
        let path = root.join(format!("{repository}.git"));
        fs::create_dir_all(&path).unwrap();
        let repo = Repository::init(&path).unwrap();
        (path, repo)
    }

    /// Commit `file` with `content` on `branch` and point HEAD at it
    pub fn commit_file(repo: &Repository, branch: &str, file: &str, content: &str) -> Oid {
        let workdir = repo.workdir().unwrap();
        fs::write(workdir.join(file), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(file)).unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test", "test@test.com").unwrap();
        let refname = format!("refs/heads/{branch}");
        let parent = repo
            .find_reference(&refname)
            .ok()
            .and_then(|r| r.peel_to_commit().ok());
        let parents: Vec<&Commit> = parent.iter().collect();
        let oid = repo
            .commit(Some(&refname), &sig, &sig, "commit", &tree, &parents)
            .unwrap();
        repo.set_head(&refname).unwrap();
        oid
    }

    pub struct StaticResolver(pub String);

    impl CloneUrlResolver for StaticResolver {
        fn clone_url(&self, _repository: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }
}
