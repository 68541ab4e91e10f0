//! File system errors

use super::SyncError;

/// Creates a file read error
pub fn read_failed(path: impl Into<String>, reason: impl Into<String>) -> SyncError {
    SyncError::FileReadFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an IO error
pub fn io_error(message: impl Into<String>) -> SyncError {
    SyncError::IoError {
        message: message.into(),
    }
}
