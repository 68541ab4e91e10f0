//! Configuration errors

use super::SyncError;

/// Creates a configuration not found error
pub fn not_found(path: impl Into<String>) -> SyncError {
    SyncError::ConfigNotFound { path: path.into() }
}

/// Creates a configuration parse error
pub fn parse_failed(path: impl Into<String>, reason: impl Into<String>) -> SyncError {
    SyncError::ConfigParseFailed {
        path: path.into(),
        reason: reason.into(),
    }
}

/// Creates an invalid configuration error
pub fn invalid(message: impl Into<String>) -> SyncError {
    SyncError::ConfigInvalid {
        message: message.into(),
    }
}

/// Creates an error for a package name missing from the configuration
pub fn package_not_configured(name: impl Into<String>) -> SyncError {
    SyncError::PackageNotConfigured { name: name.into() }
}
