//! Common test utilities for devsync integration tests

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use git2::{Repository, Signature};
use tempfile::TempDir;

/// A throwaway directory holding a config file, package dirs and the cache
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to workspace root
    pub path: PathBuf,
}

impl TestWorkspace {
    /// Create a new test workspace
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Check if a file exists in workspace
    #[allow(dead_code)]
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }

    /// Create a package directory in workspace
    #[allow(dead_code)]
    pub fn create_package(&self, name: &str) -> PathBuf {
        let package_path = self.path.join("ws").join(name);
        std::fs::create_dir_all(&package_path).expect("Failed to create package directory");
        package_path
    }

    /// Write `devsync.yaml` with the given packages section and defaults
    /// that keep real package managers out of the way
    pub fn write_config(&self, packages: &str) {
        self.write_config_with_npm("devsync-no-such-npm", packages);
    }

    /// Like [`TestWorkspace::write_config`] with `npm` as the npm program
    pub fn write_config_with_npm(&self, npm: &str, packages: &str) {
        self.write_file(
            "devsync.yaml",
            &format!(
                "repo_storage_directory: repos\n\
                 github_base_url: 'file://{}'\n\
                 python: 'true'\n\
                 npm: '{npm}'\n\
                 packages:\n{packages}",
                self.upstreams().display()
            ),
        );
    }

    /// Write an executable shell script and return its absolute path
    #[cfg(unix)]
    #[allow(dead_code)]
    pub fn write_script(&self, path: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        self.write_file(path, &format!("#!/bin/sh\n{body}"));
        let script = self.path.join(path);
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
            .expect("Failed to make script executable");
        script
    }

    /// Directory holding upstream repositories as `<owner>/<repo>.git`
    pub fn upstreams(&self) -> PathBuf {
        self.path.join("upstreams")
    }

    /// Create an upstream repository with one commit on `branch`
    #[allow(dead_code)]
    pub fn create_upstream(&self, repository: &str, branch: &str, file: &str, content: &str) {
        let path = self.upstreams().join(format!("{repository}.git"));
        std::fs::create_dir_all(&path).expect("Failed to create upstream directory");
        let repo = Repository::init(&path).expect("Failed to init upstream");
        commit(&repo, branch, file, content);
    }

    /// Command running the devsync binary inside this workspace
    pub fn devsync(&self) -> Command {
        let mut cmd = Command::new(devsync_bin());
        cmd.current_dir(&self.path)
            .env("DEVSYNC_CACHE_DIR", self.path.join("cache"))
            .env_remove("DEVSYNC_CONFIG")
            .env_remove("GITHUB_TOKEN")
            .env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

/// Get path to devsync binary
pub fn devsync_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_devsync"))
}

/// Commit `file` with `content` on `branch` of a non-bare repository
pub fn commit(repo: &Repository, branch: &str, file: &str, content: &str) {
    let workdir = repo.workdir().expect("Upstream must have a working tree");
    std::fs::write(workdir.join(file), content).expect("Failed to write file");
    let mut index = repo.index().expect("Failed to open index");
    index.add_path(Path::new(file)).expect("Failed to stage file");
    index.write().expect("Failed to write index");
    let tree = repo
        .find_tree(index.write_tree().expect("Failed to write tree"))
        .expect("Failed to find tree");
    let sig = Signature::now("Test", "test@test.com").expect("Failed to create signature");
    let refname = format!("refs/heads/{branch}");
    let parent = repo
        .find_reference(&refname)
        .ok()
        .and_then(|r| r.peel_to_commit().ok());
    let parents: Vec<&git2::Commit> = parent.iter().collect();
    repo.commit(Some(&refname), &sig, &sig, "commit", &tree, &parents)
        .expect("Failed to commit");
    repo.set_head(&refname).expect("Failed to set HEAD");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_creation() {
        let workspace = TestWorkspace::new();
        assert!(workspace.path.exists());
    }

    #[test]
    fn test_write_config() {
        let workspace = TestWorkspace::new();
        workspace.write_config("  []\n");
        assert!(workspace.file_exists("devsync.yaml"));
    }
}
