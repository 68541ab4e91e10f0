//! Status command integration tests

mod common;

use predicates::prelude::*;

#[test]
fn test_status_shows_sources_and_link_preference() {
    let workspace = common::TestWorkspace::new();
    workspace.create_package("foo");
    workspace.write_config(
        "  - name: foo\n    local_path: ws/foo\n    link_package: false\n\
         \x20 - name: widgets\n    github_branch: { repository: acme/widgets, branch: main }\n",
    );

    workspace
        .devsync()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Source: local"))
        .stdout(predicate::str::contains("Link: no"))
        .stdout(predicate::str::contains("Source: acme/widgets@main"))
        .stdout(predicate::str::contains("Tracks: acme/main"))
        .stdout(predicate::str::contains("(missing)"))
        .stdout(predicate::str::contains("Installed: never"));
}

#[test]
fn test_status_does_not_clone() {
    let workspace = common::TestWorkspace::new();
    workspace.create_upstream("acme/widgets", "main", "setup.py", "");
    workspace.write_config(
        "  - name: widgets\n    github_branch: { repository: acme/widgets, branch: main }\n",
    );

    workspace.devsync().arg("status").assert().success();
    assert!(!workspace.file_exists("repos/widgets"));
}

#[test]
fn test_status_unknown_package() {
    let workspace = common::TestWorkspace::new();
    workspace.write_config("  []\n");
    workspace
        .devsync()
        .args(["status", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'ghost' is not declared"));
}

#[test]
fn test_status_links_reports_query_failure() {
    let workspace = common::TestWorkspace::new();
    workspace.create_package("foo");
    workspace.write_config("  - name: foo\n    local_path: ws/foo\n");
    workspace
        .devsync()
        .args(["status", "--links"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Linked: unknown"));
}

#[cfg(unix)]
#[test]
fn test_status_links_checks_dependencies_of_node_packages() {
    let workspace = common::TestWorkspace::new();
    workspace.write_file("ws/app/react/package.json", "{}");
    workspace.write_file("ws/foo/react/package.json", "{}");
    workspace.create_package("bar");
    // `npm list` resolves foo into the workspace; the global registry is empty
    let npm = workspace.write_script(
        "bin/npm",
        "if [ \"$1\" = list ]; then\n  echo 'root@1.0.0'\n  echo '+-- foo@0.1.0 -> ./../../ws/foo/react'\nfi\n",
    );
    workspace.write_config_with_npm(
        &npm.display().to_string(),
        "  - name: app\n    local_path: ws/app\n\
         \x20 - name: foo\n    local_path: ws/foo\n\
         \x20 - name: bar\n    local_path: ws/bar\n    link_package: false\n",
    );

    workspace
        .devsync()
        .args(["status", "--links", "app"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Kind: node"))
        .stdout(predicate::str::contains("Linked: no"))
        .stdout(predicate::str::contains("Linked to:"))
        .stdout(predicate::str::contains("foo: yes"))
        .stdout(predicate::str::contains("bar:").not());

    workspace
        .devsync()
        .args(["status", "--links", "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("app: no"));
}

#[test]
fn test_status_links_skips_dependency_check_for_python_packages() {
    let workspace = common::TestWorkspace::new();
    workspace.create_package("foo");
    workspace.create_package("bar");
    workspace.write_config(
        "  - name: foo\n    local_path: ws/foo\n\
         \x20 - name: bar\n    local_path: ws/bar\n",
    );
    workspace
        .devsync()
        .args(["status", "--links", "foo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Linked to:").not());
}
