//! Integration tests for the CLI skeleton: help, version, usage errors.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn hostcheck() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("hostcheck"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    hostcheck().assert().code(2).stderr(predicate::str::contains(
        "Declarative host-state compliance checks",
    ));
}

#[test]
fn test_cli_help_flag_lists_commands() {
    hostcheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("verify"))
        .stdout(predicate::str::contains("inspect"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    hostcheck()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostcheck"));
}

#[test]
fn test_version_command_shows_version() {
    hostcheck()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hostcheck 0.1.0"));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = hostcheck()
        .args(["version", "--json"])
        .output()
        .expect("run hostcheck");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("version output is JSON");
    assert_eq!(value["version"], "0.1.0");
}

// --- Usage errors ---

#[test]
fn test_unknown_subcommand_exits_two() {
    hostcheck()
        .arg("frobnicate")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_verify_requires_a_suite() {
    hostcheck()
        .arg("verify")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<SUITE>"));
}

#[test]
fn test_zero_concurrency_is_rejected() {
    hostcheck()
        .args(["verify", "suite.yaml", "--concurrency", "0"])
        .assert()
        .code(2);
}

#[test]
fn test_inspect_rejects_unknown_resource_kind() {
    hostcheck()
        .args(["inspect", "kernel-module", "nf_tables"])
        .assert()
        .code(2);
}
