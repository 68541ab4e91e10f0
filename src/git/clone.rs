//! Repository cloning operations

use std::path::Path;

use git2::{FetchOptions, Repository, build::RepoBuilder};

use super::error::interpret_git_error;
use super::url::{normalize_file_url_for_clone, normalize_ssh_url_for_clone, redact_url};
use crate::error::{self, Result};

/// Clone a git repository into `target`
///
/// `target` must be missing or empty. A directory with other contents is
/// left untouched and reported as a clone failure.
pub fn clone(url: &str, target: &Path, fetch_options: FetchOptions<'_>) -> Result<Repository> {
    let mut builder = RepoBuilder::new();
    builder.fetch_options(fetch_options);

    // Normalize URLs for libgit2 compatibility
    let url_to_clone = normalize_ssh_url_for_clone(url);
    let url_to_clone = normalize_file_url_for_clone(&url_to_clone);
    builder
        .clone(url_to_clone.as_ref(), target)
        .map_err(|e| error::git::clone_failed(redact_url(url), interpret_git_error(&e)))
}
