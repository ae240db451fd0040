//! Integration tests for `hostcheck config`.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn hostcheck(config_dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hostcheck"));
    cmd.env("NO_COLOR", "1");
    cmd.env("HOSTCHECK_CONFIG", config_dir.path().join("config.yaml"));
    cmd
}

#[test]
fn test_config_show_prints_defaults() {
    let dir = TempDir::new().expect("tempdir");
    hostcheck(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("run.concurrency:"))
        .stdout(predicate::str::contains("packages.manager:"))
        .stdout(predicate::str::contains("auto"));
}

#[test]
fn test_config_set_then_show_reflects_value() {
    let dir = TempDir::new().expect("tempdir");
    hostcheck(&dir)
        .args(["config", "set", "run.concurrency", "6"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Set run.concurrency = 6"));

    let output = hostcheck(&dir)
        .args(["config", "show", "--json"])
        .output()
        .expect("run hostcheck");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("config output is JSON");
    assert_eq!(value["config"]["run"]["concurrency"], 6);
}

#[test]
fn test_config_set_unknown_key_exits_two() {
    let dir = TempDir::new().expect("tempdir");
    hostcheck(&dir)
        .args(["config", "set", "run.parallel", "4"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown setting: run.parallel"));
    assert!(!dir.path().join("config.yaml").exists());
}

#[test]
fn test_config_set_invalid_value_json_error() {
    let dir = TempDir::new().expect("tempdir");
    let output = hostcheck(&dir)
        .args(["--json", "config", "set", "packages.manager", "zypper"])
        .output()
        .expect("run hostcheck");
    assert_eq!(output.status.code(), Some(2));
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("error output is JSON");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "setup_error");
}
