//! Resource queries and the typed snapshots they resolve to.
//!
//! Snapshots are immutable point-in-time records. Absence of a resource is a
//! valid snapshot state, never an error. All parsers here are pure.

pub mod command;
pub mod file;
pub mod mount;
pub mod package;
pub mod service;
pub mod user;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use command::CommandOutput;
pub use file::FileSnapshot;
pub use mount::{MountPoint, parse_mounts};
pub use package::{PackageManager, PackageSnapshot, PackageState};
pub use service::{LoadState, ServiceSnapshot};
pub use user::{GroupSnapshot, UserSnapshot};

/// Kind of inspectable resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    File,
    Package,
    Service,
    User,
    Group,
    MountPoint,
    Sysctl,
    Command,
}

impl ResourceKind {
    pub const ALL: [Self; 8] = [
        Self::File,
        Self::Package,
        Self::Service,
        Self::User,
        Self::Group,
        Self::MountPoint,
        Self::Sysctl,
        Self::Command,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Package => "package",
            Self::Service => "service",
            Self::User => "user",
            Self::Group => "group",
            Self::MountPoint => "mount",
            Self::Sysctl => "sysctl",
            Self::Command => "command",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s || (s == "mount_point" && *k == Self::MountPoint))
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown resource kind '{s}' (valid: {})", valid.join(", "))
            })
    }
}

/// A `(kind, identifier)` pair, e.g. `(File, "/etc/dnf/dnf.conf")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceQuery {
    pub kind: ResourceKind,
    pub id: String,
}

impl ResourceQuery {
    #[must_use]
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }
}

impl fmt::Display for ResourceQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.id)
    }
}

/// Any snapshot, tagged with its kind. Used to dump a single query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "snapshot", rename_all = "snake_case")]
pub enum Snapshot {
    File(FileSnapshot),
    Package(PackageSnapshot),
    Service(ServiceSnapshot),
    User(UserSnapshot),
    Group(GroupSnapshot),
    /// `None` when the path is not a mount point.
    Mount(Option<MountPoint>),
    Sysctl(CommandOutput),
    Command(CommandOutput),
}
