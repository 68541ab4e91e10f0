//! Package manager command errors

use super::SyncError;

/// Creates an error for a command that could not run or exited non-zero
pub fn command_failed(command: impl Into<String>, reason: impl Into<String>) -> SyncError {
    SyncError::CommandFailed {
        command: command.into(),
        reason: reason.into(),
    }
}

/// Creates an error for a command killed after its deadline
pub fn command_timed_out(command: impl Into<String>, secs: u64) -> SyncError {
    SyncError::CommandTimedOut {
        command: command.into(),
        secs,
    }
}

/// Creates an error for a link query that produced no usable listing
pub fn link_query_failed(command: impl Into<String>, reason: impl Into<String>) -> SyncError {
    SyncError::LinkQueryFailed {
        command: command.into(),
        reason: reason.into(),
    }
}
