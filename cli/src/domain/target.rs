//! Target descriptors and their parser.
//!
//! Pure functions only; no I/O, no async.

use std::fmt;
use std::path::PathBuf;

use crate::domain::error::TargetError;

/// Default SSH port.
pub const DEFAULT_SSH_PORT: u16 = 22;

/// Container runtime used for `exec`-based targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerRuntime {
    Docker,
    Podman,
}

impl ContainerRuntime {
    /// Name of the runtime binary.
    #[must_use]
    pub fn program(self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }
}

/// Remote shell endpoint and credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshTarget {
    pub host: String,
    pub user: Option<String>,
    pub port: u16,
    /// Private key passed to `ssh -i`.
    pub identity: Option<PathBuf>,
}

impl SshTarget {
    /// `user@host` or just `host`.
    #[must_use]
    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        }
    }
}

/// A connectable target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Local,
    Ssh(SshTarget),
    Container {
        runtime: ContainerRuntime,
        name: String,
    },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Ssh(ssh) if ssh.port == DEFAULT_SSH_PORT => {
                write!(f, "ssh://{}", ssh.destination())
            }
            Self::Ssh(ssh) => write!(f, "ssh://{}:{}", ssh.destination(), ssh.port),
            Self::Container { runtime, name } => write!(f, "{}://{name}", runtime.program()),
        }
    }
}

/// A parsed target descriptor: either connectable as-is, or an inventory
/// handle that still needs resolution by an inventory provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetDescriptor {
    Direct(Target),
    Inventory(String),
}

/// Parse a target descriptor string.
///
/// Accepted forms: `local`, `local://`, `ssh://[user@]host[:port][?identity=PATH]`,
/// `docker://NAME`, `podman://NAME`, `ansible://HOST_OR_GROUP`.
///
/// # Errors
///
/// Returns `TargetError::Invalid` if the descriptor is malformed.
pub fn parse_descriptor(descriptor: &str) -> Result<TargetDescriptor, TargetError> {
    let invalid = |reason: &str| TargetError::Invalid {
        descriptor: descriptor.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = descriptor.trim();
    if trimmed == "local" || trimmed == "local://" {
        return Ok(TargetDescriptor::Direct(Target::Local));
    }

    let (scheme, rest) = trimmed
        .split_once("://")
        .ok_or_else(|| invalid("expected local, ssh://, docker://, podman:// or ansible://"))?;

    match scheme {
        "ssh" => parse_ssh(rest).map(|t| TargetDescriptor::Direct(Target::Ssh(t))).map_err(|r| invalid(&r)),
        "docker" | "podman" => {
            if rest.is_empty() || rest.contains('/') || rest.chars().any(char::is_whitespace) {
                return Err(invalid("container name must be a single non-empty token"));
            }
            let runtime = if scheme == "docker" {
                ContainerRuntime::Docker
            } else {
                ContainerRuntime::Podman
            };
            Ok(TargetDescriptor::Direct(Target::Container {
                runtime,
                name: rest.to_string(),
            }))
        }
        "ansible" => {
            if rest.is_empty() || rest.chars().any(char::is_whitespace) {
                return Err(invalid("inventory handle must be a single non-empty token"));
            }
            Ok(TargetDescriptor::Inventory(rest.to_string()))
        }
        other => Err(invalid(&format!("unknown scheme '{other}'"))),
    }
}

fn parse_ssh(rest: &str) -> Result<SshTarget, String> {
    let (authority, query) = match rest.split_once('?') {
        Some((a, q)) => (a, Some(q)),
        None => (rest, None),
    };

    let (user, host_port) = match authority.rsplit_once('@') {
        Some((user, hp)) if !user.is_empty() => (Some(user.to_string()), hp),
        Some(_) => return Err("empty user before '@'".to_string()),
        None => (None, authority),
    };

    let (host, port) = match host_port.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| format!("invalid port '{port}'"))?;
            (host, port)
        }
        None => (host_port, DEFAULT_SSH_PORT),
    };
    if host.is_empty() || host.contains('/') {
        return Err("missing host".to_string());
    }

    let mut identity = None;
    if let Some(query) = query {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            match pair.split_once('=') {
                Some(("identity", path)) if !path.is_empty() => {
                    identity = Some(PathBuf::from(path));
                }
                _ => return Err(format!("unsupported option '{pair}'")),
            }
        }
    }

    Ok(SshTarget {
        host: host.to_string(),
        user,
        port,
        identity,
    })
}
