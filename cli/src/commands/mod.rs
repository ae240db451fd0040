//! Command implementations

pub mod config;
pub mod inspect;
pub mod verify;
pub mod version;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::application::resources::Host;
use crate::application::services::target::resolve_target;
use crate::domain::config::RunConfig;
use crate::infra::backend::HostBackend;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::inventory::AnsibleInventory;

/// Target selection shared by commands that talk to a host.
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Target: local, ssh://[user@]host[:port], docker://NAME, podman://NAME or ansible://HOST
    #[arg(long, short = 't', default_value = "local")]
    pub target: String,

    /// Ansible inventory for ansible:// targets [default: $MOLECULE_INVENTORY_FILE]
    #[arg(long, value_name = "FILE")]
    pub inventory: Option<PathBuf>,
}

/// Resolve the target and open a session on it.
///
/// # Errors
///
/// Returns an error if the descriptor is invalid or the inventory cannot
/// resolve it.
pub async fn open_host(args: &TargetArgs, config: &RunConfig) -> Result<Host<HostBackend>> {
    let inventory = AnsibleInventory::from_env(TokioCommandRunner::default(), args.inventory.clone());
    let target = resolve_target(&args.target, &inventory)
        .await
        .context("cannot resolve target")?;
    let runner = TokioCommandRunner::new(config.command_timeout());
    let backend = HostBackend::connect(runner, &target, config);
    Ok(Host::with_package_manager(backend, config.package_manager()))
}
