//! `hostcheck inspect`: print one resource snapshot.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::commands::{TargetArgs, open_host};
use crate::domain::snapshot::{ResourceKind, ResourceQuery};

/// Arguments for the inspect command.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Resource kind: file, package, service, user, group, mount, sysctl, command
    pub kind: ResourceKind,

    /// Path, package, unit, user, group, mount point, sysctl key or command line
    pub id: String,

    #[command(flatten)]
    pub target: TargetArgs,
}

/// Run the inspect command.
///
/// # Errors
///
/// Returns an error if the target cannot be resolved or the resource cannot
/// be read.
pub async fn run(app: &AppContext, args: &InspectArgs) -> Result<ExitCode> {
    let config = app.config_store.load()?;
    let host = open_host(&args.target, &config).await?;
    let query = ResourceQuery::new(args.kind, args.id.clone());
    let snapshot = host
        .inspect(&query)
        .await
        .with_context(|| format!("cannot inspect {query}"))?;
    app.renderer()
        .render_snapshot(&query, &host.label(), &snapshot)?;
    Ok(ExitCode::SUCCESS)
}
