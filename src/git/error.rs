//! Git error handling
//!
//! This module handles:
//! - Interpreting git2 errors into user-friendly messages
//! - Categorizing errors by type (not found, auth, network, etc.)

use git2::{Error, ErrorClass};

/// Internal enum for error type classification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ErrorKind {
    RepositoryNotFound,
    AuthenticationFailed,
    PermissionDenied,
    NetworkError,
    HttpCertificate,
    HttpSsl,
    Other(ErrorClass),
}

type ErrorCheck = fn(&str, ErrorClass) -> bool;

const ERROR_CLASSIFICATIONS: &[(ErrorCheck, ErrorKind)] = &[
    (
        |msg, _| {
            msg.contains("not found")
                || msg.contains("404")
                || msg.contains("too many redirects")
                || msg.contains("authentication replays")
        },
        ErrorKind::RepositoryNotFound,
    ),
    (
        |msg, _| msg.contains("authentication") || msg.contains("credentials"),
        ErrorKind::AuthenticationFailed,
    ),
    (
        |msg, _| msg.contains("permission denied") || msg.contains("access denied"),
        ErrorKind::PermissionDenied,
    ),
    (
        |msg, _| {
            msg.contains("connection")
                || msg.contains("network")
                || msg.contains("timeout")
                || msg.contains("timed out")
        },
        ErrorKind::NetworkError,
    ),
    (
        |msg, class| class == ErrorClass::Http && msg.contains("certificate"),
        ErrorKind::HttpCertificate,
    ),
    (
        |msg, class| class == ErrorClass::Http && msg.contains("ssl"),
        ErrorKind::HttpSsl,
    ),
];

fn classify(msg: &str, class: ErrorClass) -> ErrorKind {
    ERROR_CLASSIFICATIONS
        .iter()
        .find(|(check, _)| check(msg, class))
        .map_or(ErrorKind::Other(class), |(_, kind)| *kind)
}

/// Interpret a git2 error and provide a more user-friendly message
pub fn interpret_git_error(err: &Error) -> String {
    let message = err.message().to_lowercase();

    match classify(&message, err.class()) {
        ErrorKind::RepositoryNotFound => "Repository not found".to_string(),
        ErrorKind::AuthenticationFailed => "Authentication failed".to_string(),
        ErrorKind::PermissionDenied => "Permission denied".to_string(),
        ErrorKind::NetworkError => "Network error".to_string(),
        ErrorKind::HttpCertificate => "Certificate error".to_string(),
        ErrorKind::HttpSsl => "SSL error".to_string(),
        ErrorKind::Other(ErrorClass::Http) => format!("HTTP error: {}", err.message()),
        ErrorKind::Other(ErrorClass::Ssh) => format!("SSH error: {}", err.message()),
        ErrorKind::Other(_) => err.message().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::ErrorCode;

    fn err(class: ErrorClass, msg: &str) -> Error {
        Error::new(ErrorCode::GenericError, class, msg)
    }

    #[test]
    fn test_interpret_not_found() {
        assert_eq!(
            interpret_git_error(&err(ErrorClass::Http, "unexpected http status code: 404")),
            "Repository not found"
        );
    }

    #[test]
    fn test_interpret_auth() {
        assert_eq!(
            interpret_git_error(&err(ErrorClass::Http, "authentication required")),
            "Authentication failed"
        );
    }

    #[test]
    fn test_interpret_network() {
        assert_eq!(
            interpret_git_error(&err(ErrorClass::Net, "failed to resolve address: connection refused")),
            "Network error"
        );
    }

    #[test]
    fn test_interpret_other_http_keeps_message() {
        assert_eq!(
            interpret_git_error(&err(ErrorClass::Http, "bad gateway")),
            "HTTP error: bad gateway"
        );
    }

    #[test]
    fn test_interpret_other_keeps_message() {
        assert_eq!(
            interpret_git_error(&err(ErrorClass::Reference, "invalid reference")),
            "invalid reference"
        );
    }
}
