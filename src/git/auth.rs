//! Git authentication configuration
//!
//! A configured access token is offered first for HTTPS remotes. Without
//! one, or once the token has been rejected, authentication falls back to
//! git's native credential system:
//! - SSH agent and keys from ~/.ssh/
//! - Git credential helpers

use std::cell::Cell;

use git2::{Cred, CredentialType, Error, ErrorClass, RemoteCallbacks};

/// Username GitHub accepts together with an access token
const TOKEN_USERNAME: &str = "x-access-token";

fn auth_failed() -> Error {
    Error::new(
        git2::ErrorCode::Auth,
        ErrorClass::Http,
        "authentication failed",
    )
}

fn try_ssh_credentials(username: &str) -> std::result::Result<Cred, Error> {
    let home = dirs::home_dir().unwrap_or_default();
    let ssh_dir = home.join(".ssh");

    for key_name in &["id_ed25519", "id_rsa", "id_ecdsa"] {
        let private_key = ssh_dir.join(key_name);
        let public_key = ssh_dir.join(format!("{key_name}.pub"));

        if !private_key.exists() {
            continue;
        }

        let public_key_path = public_key.exists().then_some(public_key.as_path());

        if let Ok(cred) = Cred::ssh_key(username, public_key_path, &private_key, None) {
            return Ok(cred);
        }
    }

    Err(Error::new(
        git2::ErrorCode::Auth,
        ErrorClass::Ssh,
        "SSH key not found",
    ))
}

fn try_credential_helper(
    url: &str,
    username_from_url: Option<&str>,
) -> std::result::Result<Cred, Error> {
    let config = match git2::Config::open_default() {
        Ok(cfg) => cfg,
        Err(_) => git2::Config::new()?,
    };
    Cred::credential_helper(&config, url, username_from_url).map_err(|_| auth_failed())
}

/// Set up authentication callbacks for git operations
///
/// libgit2 calls the credentials callback again after every rejected
/// attempt, so each source is offered at most once.
pub fn setup_auth_callbacks<'a>(
    callbacks: &mut RemoteCallbacks<'a>,
    token: Option<&'a str>,
    attempts: &'a Cell<u32>,
) {
    callbacks.credentials(move |url, username_from_url, allowed_types| {
        let attempt = attempts.get();
        attempts.set(attempt + 1);

        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return match (token, attempt) {
                (Some(token), 0) => Cred::userpass_plaintext(TOKEN_USERNAME, token),
                (None, 0) | (Some(_), 1) => try_credential_helper(url, username_from_url),
                _ => Err(auth_failed()),
            };
        }

        if allowed_types.contains(CredentialType::SSH_KEY) && attempt < 2 {
            let username = username_from_url.unwrap_or("git");
            return if attempt == 0 {
                Cred::ssh_key_from_agent(username)
            } else {
                try_ssh_credentials(username)
            };
        }

        if allowed_types.contains(CredentialType::DEFAULT) && attempt == 0 {
            return Cred::default();
        }

        Err(auth_failed())
    });
}
