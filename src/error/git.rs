//! Git operation errors

use super::SyncError;

pub fn operation_failed(message: impl Into<String>) -> SyncError {
    SyncError::GitOperationFailed {
        message: message.into(),
    }
}

pub fn clone_failed(url: impl Into<String>, reason: impl Into<String>) -> SyncError {
    SyncError::GitCloneFailed {
        url: url.into(),
        reason: reason.into(),
    }
}

pub fn fetch_failed(remote: impl Into<String>, reason: impl Into<String>) -> SyncError {
    SyncError::GitFetchFailed {
        remote: remote.into(),
        reason: reason.into(),
    }
}

pub fn branch_not_found(git_ref: impl Into<String>) -> SyncError {
    SyncError::GitBranchNotFound {
        git_ref: git_ref.into(),
    }
}

pub fn checkout_failed(git_ref: impl Into<String>, reason: impl Into<String>) -> SyncError {
    SyncError::GitCheckoutFailed {
        git_ref: git_ref.into(),
        reason: reason.into(),
    }
}
