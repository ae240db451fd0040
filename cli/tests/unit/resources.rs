//! Resource modules over a scripted backend.

#![allow(clippy::unwrap_used)]

use hostcheck::application::resources::Host;
use hostcheck::domain::error::{BackendError, ResourceError, TransportError};
use hostcheck::domain::snapshot::service::{is_active_command, is_enabled_command};
use hostcheck::domain::snapshot::user::{groups_command, passwd_command};
use hostcheck::domain::snapshot::{
    PackageManager, PackageState, ResourceKind, ResourceQuery, Snapshot,
};

use crate::mocks::{FakeBackend, Reply, ok, out};

const CONF: &str = "/etc/hostcheck/test.conf";

fn ghostd_backend() -> FakeBackend {
    FakeBackend::new()
        .with_command(is_active_command("ghostd"), out(3, "inactive\n", ""))
        .with_command(
            is_enabled_command("ghostd"),
            out(
                1,
                "",
                "Failed to get unit file state for ghostd.service: No such file or directory\n",
            ),
        )
}

fn rpm_backend() -> FakeBackend {
    FakeBackend::new()
        .with_command(PackageManager::detection_command(), ok("/usr/bin/rpm\n"))
        .with_command(
            PackageManager::Rpm.query_command("bash"),
            ok("5.2.26-3.fc40\n"),
        )
        .with_command(
            PackageManager::Rpm.query_command("not-a-real-pkg-xyz"),
            out(1, "package not-a-real-pkg-xyz is not installed\n", ""),
        )
}

// ── File ──────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_file_round_trip_reports_mode_owner_and_content() {
    let host = Host::new(FakeBackend::new().with_file(CONF, "root", "root", 0o644, "X=1\n"));
    let file = host.file(CONF);

    let snap = file.snapshot().await.unwrap();
    assert!(snap.exists);
    assert!(snap.is_file);
    assert_eq!(snap.mode, 0o644);
    assert_eq!(snap.owner, "root");
    assert_eq!(snap.group, "root");
    assert!(file.contains("X=1").await.unwrap());
    assert!(!file.contains("X=2").await.unwrap());
}

#[tokio::test]
async fn test_missing_file_is_a_snapshot_not_an_error() {
    let host = Host::new(FakeBackend::new());
    let snap = host.file("/etc/nope.conf").snapshot().await.unwrap();
    assert!(!snap.exists);
    assert_eq!(snap.mode, 0);
    assert!(!host.file("/etc/nope.conf").exists().await.unwrap());
}

#[tokio::test]
async fn test_unreadable_content_is_not_readable_error() {
    let host = Host::new(FakeBackend::new().with_unreadable_file("/etc/shadow"));
    let err = host.file("/etc/shadow").contains("root").await.unwrap_err();
    assert!(matches!(err, ResourceError::NotReadable { ref path, .. } if path == "/etc/shadow"));

    let err = host.file("/etc/missing").content().await.unwrap_err();
    assert!(matches!(err, ResourceError::NotReadable { .. }));
}

#[tokio::test]
async fn test_matches_is_line_anchored_and_rejects_bad_patterns() {
    let content = "# managed\nPermitRootLogin no\nPasswordAuthentication no\n";
    let host = Host::new(FakeBackend::new().with_file("/etc/ssh/sshd_config", "root", "root", 0o600, content));
    let file = host.file("/etc/ssh/sshd_config");

    assert!(file.matches(r"^PermitRootLogin\s+no$").await.unwrap());
    assert!(!file.matches(r"^PermitRootLogin\s+yes$").await.unwrap());
    assert!(matches!(
        file.matches("(unclosed").await.unwrap_err(),
        ResourceError::InvalidPattern { .. }
    ));
}

#[tokio::test]
async fn test_list_dir_is_sorted() {
    let backend = FakeBackend::new()
        .with_file("/etc/yum.repos.d/fedora.repo", "root", "root", 0o644, "")
        .with_file("/etc/yum.repos.d/code.repo", "root", "root", 0o644, "");
    let host = Host::new(backend);
    assert_eq!(
        host.file("/etc/yum.repos.d").list_dir().await.unwrap(),
        vec!["code.repo", "fedora.repo"]
    );
}

// ── Service ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_absent_service_is_not_running_and_not_enabled() {
    let host = Host::new(ghostd_backend());
    let service = host.service("ghostd");

    assert!(!service.is_running().await.unwrap());
    assert!(!service.is_enabled().await.unwrap());
    let snap = service.snapshot().await.unwrap();
    assert!(!snap.exists());
    assert!(!snap.running);
    assert!(!snap.enabled);
}

#[tokio::test]
async fn test_running_enabled_service() {
    let backend = FakeBackend::new()
        .with_command(is_active_command("chronyd"), ok("active\n"))
        .with_command(is_enabled_command("chronyd"), ok("enabled\n"));
    let host = Host::new(backend);
    let snap = host.service("chronyd").snapshot().await.unwrap();
    assert!(snap.exists());
    assert!(snap.running);
    assert!(snap.enabled);
    assert_eq!(snap.unit_file_state, "enabled");
}

#[tokio::test]
async fn test_service_transport_fault_is_surfaced_unmodified() {
    let fault = TransportError::AuthFailed("admin@10.0.0.5".to_string());
    let backend = FakeBackend::new().with_reply(is_active_command("sshd"), Reply::Fault(fault.clone()));
    let host = Host::new(backend);
    assert_eq!(
        host.service("sshd").is_running().await.unwrap_err(),
        BackendError::Transport(fault)
    );
}

// ── Package ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_installed_and_absent_packages() {
    let host = Host::new(rpm_backend());

    let bash = host.package("bash").snapshot().await.unwrap();
    assert!(bash.is_installed());
    assert_eq!(bash.version.as_deref(), Some("5.2.26-3.fc40"));

    let missing = host.package("not-a-real-pkg-xyz").snapshot().await.unwrap();
    assert!(!missing.is_installed());
    assert_eq!(missing.state, PackageState::Absent);
    assert_ne!(missing.exit_code, 0);
}

#[tokio::test]
async fn test_package_manager_is_detected_once_per_session() {
    let host = Host::new(rpm_backend());
    assert!(host.package("bash").is_installed().await.unwrap());
    assert!(!host.package("not-a-real-pkg-xyz").is_installed().await.unwrap());

    let detections = host
        .backend()
        .calls()
        .iter()
        .filter(|c| **c == PackageManager::detection_command())
        .count();
    assert_eq!(detections, 1);
}

#[tokio::test]
async fn test_configured_package_manager_skips_detection() {
    let backend = FakeBackend::new().with_command(
        PackageManager::Dpkg.query_command("chrony"),
        ok("install ok config-files|4.2-5\n"),
    );
    let host = Host::with_package_manager(backend, Some(PackageManager::Dpkg));
    let snap = host.package("chrony").snapshot().await.unwrap();
    assert_eq!(snap.state, PackageState::Partial);
    assert!(!snap.is_installed());
    assert!(
        !host
            .backend()
            .calls()
            .contains(&PackageManager::detection_command())
    );
}

#[tokio::test]
async fn test_no_package_manager_is_protocol_error() {
    let backend = FakeBackend::new().with_command(PackageManager::detection_command(), ok(""));
    let host = Host::new(backend);
    assert!(matches!(
        host.package("bash").snapshot().await.unwrap_err(),
        BackendError::Protocol(_)
    ));
}

// ── User, mount, sysctl, inspect ──────────────────────────────────────────────

#[tokio::test]
async fn test_user_snapshot_collects_groups() {
    let backend = FakeBackend::new()
        .with_command(
            passwd_command("chrony"),
            ok("chrony:x:994:991:chrony system user:/var/lib/chrony:/sbin/nologin\n"),
        )
        .with_command(groups_command("chrony"), ok("chrony wheel\n"))
        .with_command(passwd_command("ghost"), out(2, "", ""));
    let host = Host::new(backend);

    let chrony = host.user("chrony").snapshot().await.unwrap();
    assert_eq!(chrony.uid, Some(994));
    assert_eq!(chrony.shell, "/sbin/nologin");
    assert_eq!(chrony.groups, vec!["chrony", "wheel"]);

    let ghost = host.user("ghost").snapshot().await.unwrap();
    assert!(!ghost.exists);
    assert!(!host.user("ghost").exists().await.unwrap());
}

#[tokio::test]
async fn test_mount_point_lookup() {
    let table = "proc /proc proc rw,nosuid,nodev,noexec 0 0\n\
                 tmpfs /tmp tmpfs rw,nosuid,nodev,size=1024k 0 0\n";
    let host = Host::new(FakeBackend::new().with_file("/proc/mounts", "root", "root", 0o444, table));

    let tmp = host.mount_point("/tmp").snapshot().await.unwrap().unwrap();
    assert_eq!(tmp.filesystem, "tmpfs");
    assert!(tmp.has_option("nodev"));
    assert!(!host.mount_point("/var/tmp").is_mounted().await.unwrap());
}

#[tokio::test]
async fn test_sysctl_value_and_unknown_key() {
    let backend = FakeBackend::new()
        .with_command("sysctl -n kernel.randomize_va_space", ok("2\n"))
        .with_command(
            "sysctl -n kernel.nope",
            out(255, "", "sysctl: cannot stat /proc/sys/kernel/nope: No such file or directory\n"),
        );
    let host = Host::new(backend);
    assert_eq!(
        host.sysctl("kernel.randomize_va_space").value().await.unwrap().as_deref(),
        Some("2")
    );
    assert_eq!(host.sysctl("kernel.nope").value().await.unwrap(), None);
}

#[tokio::test]
async fn test_inspect_dispatches_by_kind() {
    let host = Host::new(ghostd_backend().with_command("uname -r", ok("6.8.9\n")));

    let service = host
        .inspect(&ResourceQuery::new(ResourceKind::Service, "ghostd"))
        .await
        .unwrap();
    assert!(matches!(service, Snapshot::Service(ref s) if !s.running));

    let command = host
        .inspect(&ResourceQuery::new(ResourceKind::Command, "uname -r"))
        .await
        .unwrap();
    let Snapshot::Command(output) = command else {
        panic!("expected command snapshot");
    };
    assert_eq!(output.stdout, "6.8.9\n");
    assert!(output.succeeded());
}
