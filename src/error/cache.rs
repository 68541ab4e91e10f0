//! Cache errors

use super::SyncError;

/// Creates a cache operation failed error
pub fn operation_failed(message: impl Into<String>) -> SyncError {
    SyncError::CacheOperationFailed {
        message: message.into(),
    }
}
