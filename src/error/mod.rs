//! Error types and handling for devsync
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Configuration errors
//! - [`git`]: Git operation errors
//! - [`package`]: Package lifecycle and package-manager errors
//! - [`cache`]: Cache errors
//! - [`fs`]: File system errors

pub mod cache;
pub mod config;
pub mod fs;
pub mod git;
pub mod package;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for devsync operations
#[derive(Error, Diagnostic, Debug)]
pub enum SyncError {
    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(devsync::config::not_found),
        help("Pass --config <path> or create devsync.yaml in the current directory")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(devsync::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },

    #[error("Invalid configuration: {message}")]
    #[diagnostic(code(devsync::config::invalid))]
    ConfigInvalid { message: String },

    #[error("Package '{name}' is not declared in the configuration file")]
    #[diagnostic(
        code(devsync::config::package_not_configured),
        help("Add an entry for '{name}' under `packages:`")
    )]
    PackageNotConfigured { name: String },

    // Git errors
    #[error("Git operation failed: {message}")]
    #[diagnostic(code(devsync::git::operation_failed))]
    GitOperationFailed { message: String },

    #[error("Failed to clone repository: {url}: {reason}")]
    #[diagnostic(
        code(devsync::git::clone_failed),
        help("Check that the repository exists and the access token can read it")
    )]
    GitCloneFailed { url: String, reason: String },

    #[error("Failed to fetch remote '{remote}': {reason}")]
    #[diagnostic(code(devsync::git::fetch_failed))]
    GitFetchFailed { remote: String, reason: String },

    #[error("Branch '{git_ref}' does not exist on the remote")]
    #[diagnostic(
        code(devsync::git::branch_not_found),
        help("Check the `branch` of this package in the configuration file")
    )]
    GitBranchNotFound { git_ref: String },

    #[error("Failed to checkout '{git_ref}': {reason}")]
    #[diagnostic(
        code(devsync::git::checkout_failed),
        help("Commit or stash local changes in the checkout and run again")
    )]
    GitCheckoutFailed { git_ref: String, reason: String },

    // Package manager errors
    #[error("Command `{command}` failed: {reason}")]
    #[diagnostic(code(devsync::package::command_failed))]
    CommandFailed { command: String, reason: String },

    #[error("Command `{command}` timed out after {secs} seconds")]
    #[diagnostic(
        code(devsync::package::command_timed_out),
        help("Raise `command_timeout_secs` in the configuration file")
    )]
    CommandTimedOut { command: String, secs: u64 },

    #[error("Could not query linked packages with `{command}`: {reason}")]
    #[diagnostic(code(devsync::package::link_query_failed))]
    LinkQueryFailed { command: String, reason: String },

    #[error("{failed} of {total} packages failed to sync")]
    #[diagnostic(
        code(devsync::package::sync_failed),
        help("Run again with --verbose for details")
    )]
    SyncFailed { failed: usize, total: usize },

    #[error("Unknown shell: {shell}")]
    #[diagnostic(
        code(devsync::cli::unknown_shell),
        help("Supported shells: bash, elvish, fish, powershell, zsh")
    )]
    UnknownShell { shell: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(devsync::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(devsync::fs::io_error))]
    IoError { message: String },

    // Cache errors
    #[error("Cache operation failed: {message}")]
    #[diagnostic(code(devsync::cache::operation_failed))]
    CacheOperationFailed { message: String },
}

impl From<std::io::Error> for SyncError {
    fn from(err: std::io::Error) -> Self {
        SyncError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for SyncError {
    fn from(err: serde_yaml::Error) -> Self {
        SyncError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

impl From<git2::Error> for SyncError {
    fn from(err: git2::Error) -> Self {
        SyncError::GitOperationFailed {
            message: err.message().to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, SyncError>;
