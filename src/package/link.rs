//! Reading npm link state out of `npm ls` listings
//!
//! Both queries only look for substrings in npm's tree output, with paths
//! compared using forward slashes and no trailing separator.

use std::path::Path;

use crate::error::{self, Result};
use crate::exec::CommandOutput;
use crate::path_utils::{strip_trailing_separator, to_forward_slashes};

/// Arguments listing globally linked packages
pub const GLOBAL_LINKS_ARGS: &[&str] = &["ls", "-g", "--depth=0", "--link=true"];

/// Arguments listing a project's resolved dependencies
pub const DEPENDENCIES_ARGS: &[&str] = &["list"];

fn normalize(path: &str) -> String {
    strip_trailing_separator(&path.replace('\\', "/")).to_string()
}

/// Turn a finished `npm ls` into its listing.
///
/// npm exits non-zero for problems such as extraneous or missing packages
/// but still prints the tree, so only a failure without any output counts
/// as a failed query.
pub fn listing(output: CommandOutput, command: &str) -> Result<String> {
    if output.success || !output.stdout.trim().is_empty() {
        return Ok(output.stdout);
    }
    let reason = match output.stderr.trim() {
        "" => output
            .code
            .map_or_else(|| "terminated by signal".to_string(), |c| format!("exit code {c}")),
        stderr => stderr.to_string(),
    };
    Err(error::package::link_query_failed(command, reason))
}

/// Whether `path` appears anywhere in the global link listing
pub fn listing_contains_path(listing: &str, path: &Path) -> bool {
    let path = normalize(&to_forward_slashes(dunce::simplified(path)));
    !path.is_empty() && listing.replace('\\', "/").contains(&path)
}

/// Whether a line of the dependency listing names `package` at `path`.
///
/// An empty `path` accepts the package wherever it resolves to.
pub fn listing_links_to(listing: &str, package: &str, path: &str) -> bool {
    let path = normalize(path);
    listing.lines().any(|line| {
        line.contains(package) && (path.is_empty() || normalize(line).contains(&path))
    })
}
