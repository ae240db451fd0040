//! `ShellBackend` over a scripted command runner.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use futures_util::future::join_all;
use hostcheck::application::ports::Backend;
use hostcheck::application::resources::Host;
use hostcheck::domain::config::RunConfig;
use hostcheck::domain::error::{BackendError, TransportError};
use hostcheck::domain::exec::stat_command;
use hostcheck::domain::target::{ContainerRuntime, SshTarget, Target};
use hostcheck::infra::backend::{ShellBackend, Transport};
use hostcheck::infra::command_runner::TokioCommandRunner;

use crate::mocks::{FakeRunner, ok, out};

const TIMEOUT: Duration = Duration::from_secs(5);
const CONF: &str = "/etc/hostcheck/test.conf";

fn ssh_transport() -> Transport {
    Transport::Ssh {
        target: SshTarget {
            host: "10.0.0.5".to_string(),
            user: Some("admin".to_string()),
            port: 22,
            identity: Some(PathBuf::from("/keys/id_ed25519")),
        },
        options: Vec::new(),
    }
}

#[tokio::test]
async fn test_single_session_never_has_two_commands_in_flight() {
    let runner = FakeRunner::new().with_delay(Duration::from_millis(20));
    let log = runner.log();
    let backend = ShellBackend::new(runner, Transport::Local, 1, TIMEOUT);

    let calls = (0..4).map(|i| {
        let backend = &backend;
        async move { backend.execute(&format!("echo {i}")).await }
    });
    let results = join_all(calls).await;

    assert_eq!(results.len(), 4);
    assert_eq!(log.max_in_flight(), 1);
    assert_eq!(log.invocations().len(), 4);
}

#[tokio::test]
async fn test_sessions_bound_concurrent_commands() {
    let runner = FakeRunner::new().with_delay(Duration::from_millis(20));
    let log = runner.log();
    let backend = ShellBackend::new(runner, Transport::Local, 2, TIMEOUT);

    let calls = (0..6).map(|i| {
        let backend = &backend;
        async move { backend.execute(&format!("echo {i}")).await }
    });
    join_all(calls).await;

    assert!(log.max_in_flight() <= 2);
    assert!(log.max_in_flight() >= 1);
}

#[tokio::test]
async fn test_file_round_trip_through_stat_and_cat() {
    let runner = FakeRunner::new()
        .with_reply(stat_command(CONF), ok("root|root|644|regular file|4\nplain\n"))
        .with_reply(format!("cat -- {CONF}"), ok("X=1\n"));
    let host = Host::new(ShellBackend::new(runner, Transport::Local, 1, TIMEOUT));
    let file = host.file(CONF);

    let snap = file.snapshot().await.unwrap();
    assert_eq!(snap.mode, 0o644);
    assert_eq!(snap.owner, "root");
    assert!(snap.is_file);
    assert!(file.contains("X=1").await.unwrap());
}

#[tokio::test]
async fn test_missing_path_stats_as_absent_and_reads_as_not_found() {
    let missing = "stat: cannot statx '/etc/nope': No such file or directory\n";
    let runner = FakeRunner::new()
        .with_reply(stat_command("/etc/nope"), out(1, "", missing))
        .with_reply(
            "cat -- /etc/nope",
            out(1, "", "cat: /etc/nope: No such file or directory\n"),
        );
    let backend = ShellBackend::new(runner, Transport::Local, 1, TIMEOUT);

    assert!(!backend.stat("/etc/nope").await.unwrap().exists);
    assert_eq!(
        backend.read_file("/etc/nope").await.unwrap_err(),
        BackendError::NotFound("/etc/nope".to_string())
    );
}

#[tokio::test]
async fn test_ssh_connection_failure_is_transport_error() {
    let runner = FakeRunner::new().with_reply(
        "env LC_ALL=C sh -c id",
        out(255, "", "ssh: connect to host 10.0.0.5 port 22: Connection refused\n"),
    );
    let backend = ShellBackend::new(runner, ssh_transport(), 1, TIMEOUT);

    let err = backend.execute("id").await.unwrap_err();
    assert!(matches!(
        err,
        BackendError::Transport(TransportError::ConnectionRefused(_))
    ));
}

#[tokio::test]
async fn test_ssh_remote_exit_code_is_data() {
    let runner = FakeRunner::new().with_reply("env LC_ALL=C sh -c false", out(1, "", ""));
    let backend = ShellBackend::new(runner, ssh_transport(), 1, TIMEOUT);
    assert_eq!(backend.execute("false").await.unwrap().exit_code, 1);
}

#[tokio::test]
async fn test_connect_builds_container_exec_and_label() {
    let runner = FakeRunner::new().with_reply("id -u", ok("0\n"));
    let log = runner.log();
    let target = Target::Container {
        runtime: ContainerRuntime::Podman,
        name: "fedora-test".to_string(),
    };
    let backend = ShellBackend::connect(runner, &target, &RunConfig::default());

    assert_eq!(backend.label(), "podman://fedora-test");
    assert_eq!(backend.execute("id -u").await.unwrap().stdout_lossy(), "0\n");
    let (program, args) = log.invocations().remove(0);
    assert_eq!(program, "podman");
    assert_eq!(
        args,
        vec!["exec", "fedora-test", "env", "LC_ALL=C", "sh", "-c", "id -u"]
    );
}

#[tokio::test]
async fn test_local_symlink_reports_its_target() {
    use std::os::unix::fs::{PermissionsExt, symlink};

    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("app.conf");
    std::fs::write(&target, "X=1\n").unwrap();
    std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o644)).unwrap();
    let link = dir.path().join("current.conf");
    symlink(&target, &link).unwrap();
    let dangling = dir.path().join("stale.conf");
    symlink(dir.path().join("gone.conf"), &dangling).unwrap();

    let backend = ShellBackend::new(TokioCommandRunner::new(TIMEOUT), Transport::Local, 1, TIMEOUT);
    let host = Host::new(backend);

    let snap = host.file(link.display().to_string()).snapshot().await.unwrap();
    assert!(snap.exists);
    assert!(snap.is_file);
    assert!(snap.is_symlink);
    assert_eq!(snap.mode, 0o644);
    assert!(!snap.is_executable());

    let plain = host.file(target.display().to_string()).snapshot().await.unwrap();
    assert!(!plain.is_symlink);

    let stale = host.file(dangling.display().to_string()).snapshot().await.unwrap();
    assert!(!stale.exists);
}
