//! Clone URL resolution and normalization
//!
//! This module handles:
//! - Mapping a repository identifier (`owner/repo`) to a clone URL
//! - Normalizing SSH URLs from SCP-style to ssh:// format
//! - Normalizing file:// URLs for libgit2 compatibility
//! - Redacting credentials before URLs reach logs or errors

use std::borrow::Cow;

use crate::error::{self, Result};

/// Maps a repository identifier to the URL it is cloned from
pub trait CloneUrlResolver: Send + Sync {
    fn clone_url(&self, repository: &str) -> Result<String>;
}

/// Resolves `owner/repo` against a GitHub-style host
///
/// `https://github.com` gives `https://github.com/owner/repo.git`; an
/// SCP-style base such as `git@github.com:` gives `git@github.com:owner/repo.git`.
#[derive(Debug, Clone)]
pub struct GithubResolver {
    base_url: String,
}

impl GithubResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

impl CloneUrlResolver for GithubResolver {
    fn clone_url(&self, repository: &str) -> Result<String> {
        let repository = repository.trim_matches('/');
        if repository.split('/').filter(|s| !s.is_empty()).count() != 2 {
            return Err(error::config::invalid(format!(
                "repository '{repository}' must have the form <owner>/<repo>"
            )));
        }
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with(':') {
            Ok(format!("{base}{repository}.git"))
        } else {
            Ok(format!("{base}/{repository}.git"))
        }
    }
}

/// Normalize SSH URLs from SCP-style (git@host:path) to ssh:// format.
///
/// libgit2 may have issues with SCP-style SSH URLs, so we convert them to
/// the explicit ssh:// format for better compatibility.
pub fn normalize_ssh_url_for_clone(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }

    // git@host:path -> ssh://git@host/path
    if let Some((host_part, path_part)) = url.split_once(':') {
        let path = path_part.strip_prefix('/').unwrap_or(path_part);
        return Cow::Owned(format!("ssh://{host_part}/{path}"));
    }

    Cow::Borrowed(url)
}

/// Normalize file:// URLs so libgit2 can resolve them on Unix.
pub fn normalize_file_url_for_clone(url: &str) -> Cow<'_, str> {
    let Some(after) = url.strip_prefix("file://") else {
        return Cow::Borrowed(url);
    };
    #[cfg(not(windows))]
    {
        if after.contains('\\') {
            let path = after.replace('\\', "/");
            return Cow::Owned(format!("file:///{}", path.trim_start_matches('/')));
        }
        if !after.is_empty() && !after.starts_with('/') {
            return Cow::Owned(format!("file:///{after}"));
        }
    }
    #[cfg(windows)]
    let _ = after;
    Cow::Borrowed(url)
}

/// Drop any `user:password@` part from a URL.
pub fn redact_url(url: &str) -> Cow<'_, str> {
    let Some((scheme, rest)) = url.split_once("://") else {
        return Cow::Borrowed(url);
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => Cow::Owned(format!("{scheme}://{}", &rest[at + 1..])),
        None => Cow::Borrowed(url),
    }
}
