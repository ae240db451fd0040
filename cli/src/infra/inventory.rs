//! Infrastructure implementation of the `InventoryProvider` port backed by
//! `ansible-inventory`.

use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::application::ports::{CommandRunner, InventoryProvider};
use crate::domain::error::TargetError;
use crate::domain::target::{ContainerRuntime, DEFAULT_SSH_PORT, SshTarget, Target};

/// Environment variable Molecule sets to its generated inventory.
pub const INVENTORY_ENV: &str = "MOLECULE_INVENTORY_FILE";

const INVENTORY_TIMEOUT: Duration = Duration::from_secs(60);

/// Resolves handles by running `ansible-inventory -i FILE --list`.
pub struct AnsibleInventory<R> {
    runner: R,
    inventory: Option<PathBuf>,
}

impl<R: CommandRunner> AnsibleInventory<R> {
    #[must_use]
    pub fn new(runner: R, inventory: Option<PathBuf>) -> Self {
        Self { runner, inventory }
    }

    /// Use `inventory` if given, otherwise `MOLECULE_INVENTORY_FILE`.
    #[must_use]
    pub fn from_env(runner: R, inventory: Option<PathBuf>) -> Self {
        let inventory = inventory.or_else(|| std::env::var_os(INVENTORY_ENV).map(PathBuf::from));
        Self::new(runner, inventory)
    }
}

impl<R: CommandRunner> InventoryProvider for AnsibleInventory<R> {
    async fn resolve(&self, handle: &str) -> Result<Target, TargetError> {
        let unresolved = |reason: String| TargetError::Unresolved {
            handle: handle.to_string(),
            reason,
        };
        let path = self.inventory.as_ref().ok_or_else(|| {
            unresolved(format!("no inventory file (pass --inventory or set {INVENTORY_ENV})"))
        })?;
        let path = path.display().to_string();
        let output = self
            .runner
            .run_with_timeout(
                "ansible-inventory",
                &["-i", path.as_str(), "--list"],
                INVENTORY_TIMEOUT,
            )
            .await
            .map_err(|e| unresolved(e.to_string()))?;
        if !output.success() {
            return Err(unresolved(format!(
                "ansible-inventory exited {}: {}",
                output.exit_code,
                output.stderr_lossy().trim()
            )));
        }
        let inventory: Value = serde_json::from_slice(&output.stdout)
            .map_err(|e| unresolved(format!("invalid ansible-inventory output: {e}")))?;
        let target = target_from_inventory(&inventory, handle).map_err(unresolved)?;
        debug!(%handle, %target, inventory = %path, "resolved inventory handle");
        Ok(target)
    }
}

/// Resolve `handle` against `ansible-inventory --list` JSON.
///
/// A host name resolves to itself; a group name resolves to its first host,
/// searching child groups depth-first.
///
/// # Errors
///
/// Returns a reason if the handle is unknown or its connection unsupported.
pub fn target_from_inventory(inventory: &Value, handle: &str) -> Result<Target, String> {
    let host = if is_host(inventory, handle) {
        handle.to_string()
    } else if inventory.get(handle).is_some() {
        first_host(inventory, handle, 0)
            .ok_or_else(|| format!("group '{handle}' has no hosts"))?
    } else {
        return Err(format!("'{handle}' is not a host or group in the inventory"));
    };
    let empty = Value::Object(serde_json::Map::new());
    let vars = inventory
        .pointer(&format!("/_meta/hostvars/{}", escape_pointer(&host)))
        .unwrap_or(&empty);
    target_from_hostvars(&host, vars)
}

fn is_host(inventory: &Value, name: &str) -> bool {
    if inventory
        .pointer("/_meta/hostvars")
        .and_then(Value::as_object)
        .is_some_and(|h| h.contains_key(name))
    {
        return true;
    }
    inventory.as_object().is_some_and(|groups| {
        groups.values().any(|g| {
            g.get("hosts")
                .and_then(Value::as_array)
                .is_some_and(|hosts| hosts.iter().any(|h| h.as_str() == Some(name)))
        })
    })
}

/// Inventories are acyclic in practice; the depth cap guards malformed input.
fn first_host(inventory: &Value, group: &str, depth: usize) -> Option<String> {
    if depth > 32 {
        return None;
    }
    let entry = inventory.get(group)?;
    if let Some(host) = entry
        .get("hosts")
        .and_then(Value::as_array)
        .and_then(|hosts| hosts.first())
        .and_then(Value::as_str)
    {
        return Some(host.to_string());
    }
    entry
        .get("children")
        .and_then(Value::as_array)?
        .iter()
        .filter_map(Value::as_str)
        .find_map(|child| first_host(inventory, child, depth + 1))
}

fn target_from_hostvars(host: &str, vars: &Value) -> Result<Target, String> {
    let var = |key: &str| vars.get(key).and_then(Value::as_str).map(str::to_string);
    let address = var("ansible_host").unwrap_or_else(|| host.to_string());
    match var("ansible_connection").as_deref() {
        Some("local") => Ok(Target::Local),
        Some("docker" | "community.docker.docker") => Ok(Target::Container {
            runtime: ContainerRuntime::Docker,
            name: address,
        }),
        Some("podman" | "containers.podman.podman") => Ok(Target::Container {
            runtime: ContainerRuntime::Podman,
            name: address,
        }),
        None | Some("ssh" | "smart" | "paramiko") => {
            let port = match vars.get("ansible_port") {
                None => DEFAULT_SSH_PORT,
                Some(Value::Number(n)) => n
                    .as_u64()
                    .and_then(|p| u16::try_from(p).ok())
                    .ok_or_else(|| format!("invalid ansible_port {n} for {host}"))?,
                Some(Value::String(s)) => s
                    .parse()
                    .map_err(|_| format!("invalid ansible_port '{s}' for {host}"))?,
                Some(other) => return Err(format!("invalid ansible_port {other} for {host}")),
            };
            Ok(Target::Ssh(SshTarget {
                host: address,
                user: var("ansible_user"),
                port,
                identity: var("ansible_ssh_private_key_file").map(PathBuf::from),
            }))
        }
        Some(other) => Err(format!("unsupported ansible_connection '{other}' for {host}")),
    }
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}
