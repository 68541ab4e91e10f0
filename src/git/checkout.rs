//! Checkout operations for git repositories
//!
//! This module handles:
//! - Opening existing working trees
//! - Checking out the tip of a remote-tracking branch

use std::path::Path;

use git2::{ErrorCode, Oid, Repository, build::CheckoutBuilder};

use crate::error::{self, Result};

/// Open the working tree at `path`.
///
/// Returns `Ok(None)` when `path` is missing or not a repository itself;
/// parent directories are not searched.
pub fn open_working_tree(path: &Path) -> Result<Option<Repository>> {
    match Repository::open(path) {
        Ok(repo) if repo.is_bare() => Err(error::git::operation_failed(format!(
            "{} is a bare repository, expected a working tree",
            path.display()
        ))),
        Ok(repo) => Ok(Some(repo)),
        Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
        Err(e) => Err(error::git::operation_failed(format!(
            "Failed to open repository at {}: {}",
            path.display(),
            e.message()
        ))),
    }
}

/// Check out `<remote>/<branch>` with a detached HEAD.
///
/// Local modifications that the checkout would overwrite make it fail
/// instead of being discarded.
pub fn checkout_remote_branch(repo: &Repository, remote: &str, branch: &str) -> Result<Oid> {
    let git_ref = format!("{remote}/{branch}");
    let reference = match repo.find_reference(&format!("refs/remotes/{git_ref}")) {
        Ok(reference) => reference,
        Err(e) if e.code() == ErrorCode::NotFound => {
            return Err(error::git::branch_not_found(git_ref));
        }
        Err(e) => return Err(error::git::checkout_failed(git_ref, e.message())),
    };

    let commit = reference
        .peel_to_commit()
        .map_err(|e| error::git::checkout_failed(&git_ref, e.message()))?;

    let mut checkout_builder = CheckoutBuilder::new();
    checkout_builder.safe();

    repo.checkout_tree(commit.as_object(), Some(&mut checkout_builder))
        .map_err(|e| error::git::checkout_failed(&git_ref, e.message()))?;

    repo.set_head_detached(commit.id())
        .map_err(|e| error::git::checkout_failed(&git_ref, e.message()))?;

    Ok(commit.id())
}
