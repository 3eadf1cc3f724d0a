//! Integration tests for `ipless routes prune` and `ipless instances`.

#![allow(clippy::expect_used)]

use predicates::prelude::*;

use crate::support::{Sandbox, stdout_json};

#[test]
fn test_prune_with_clean_table_reports_nothing() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .args(["routes", "prune"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No broken routes found"));
}

#[cfg(unix)]
#[test]
fn test_prune_removes_only_dangling_markers() {
    let sandbox = Sandbox::new();
    let available = sandbox.path("sites-available");
    let enabled = sandbox.path("sites-enabled");
    std::fs::write(available.join("live.apps.test.conf"), "server {}\n").expect("definition");
    std::os::unix::fs::symlink(
        available.join("live.apps.test.conf"),
        enabled.join("live.apps.test.conf"),
    )
    .expect("live marker");
    std::os::unix::fs::symlink(
        available.join("gone.apps.test.conf"),
        enabled.join("gone.apps.test.conf"),
    )
    .expect("dangling marker");

    let output = sandbox
        .cmd()
        .args(["routes", "prune", "--json"])
        .output()
        .expect("run");

    assert!(output.status.success());
    let pruned = stdout_json(&output)["pruned"].clone();
    assert_eq!(pruned.as_array().expect("array").len(), 1);
    assert!(pruned[0].as_str().expect("path").ends_with("gone.apps.test.conf"));
    assert_eq!(sandbox.entries("sites-enabled"), vec!["live.apps.test.conf"]);
}

#[test]
fn test_instances_empty_registry() {
    let sandbox = Sandbox::new();
    sandbox
        .cmd()
        .arg("instances")
        .assert()
        .success()
        .stdout(predicate::str::contains("No instances provisioned yet."));
}

#[test]
fn test_instances_json_lists_recorded_instances() {
    let sandbox = Sandbox::new();
    std::fs::write(
        sandbox.path("instances.json"),
        r#"{"instances":[{"id":"storefront_0a1b2c3d","full_domain":"k3m9q2xz.apps.test","url":"http://k3m9q2xz.apps.test","workspace_path":"/srv/ipless/projects/storefront_0a1b2c3d","proxy_config_path":"/etc/nginx/sites-available/k3m9q2xz.apps.test.conf","upstream_port":3000,"pid":4242,"created_at":"2026-03-01T12:00:00Z"}]}"#,
    )
    .expect("registry");

    let output = sandbox
        .cmd()
        .args(["instances", "--json"])
        .output()
        .expect("run");

    assert!(output.status.success());
    let v = stdout_json(&output);
    assert_eq!(v["instances"][0]["id"], "storefront_0a1b2c3d");
    assert_eq!(v["instances"][0]["pid"], 4242);
}

#[test]
fn test_instances_corrupt_registry_exits_one() {
    let sandbox = Sandbox::new();
    std::fs::write(sandbox.path("instances.json"), "{oops").expect("registry");
    sandbox
        .cmd()
        .arg("instances")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("parsing registry"));
}
