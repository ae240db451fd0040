//! Resource modules: read-only translation from queries to backend calls.
//!
//! A `Host` is the session facade: it owns the backend for one run and hands
//! out lightweight per-resource handles. Nothing here is cached across checks
//! except the detected package manager.

mod file;
mod mount;
mod package;
mod service;
mod sysctl;
mod user;

pub use file::File;
pub use mount::Mount;
pub use package::Package;
pub use service::Service;
pub use sysctl::Sysctl;
pub use user::{Group, User};

use tokio::sync::OnceCell;
use tracing::debug;

use crate::application::ports::Backend;
use crate::domain::error::{BackendError, ResourceError};
use crate::domain::snapshot::{CommandOutput, PackageManager, ResourceKind, ResourceQuery, Snapshot};

/// One target session. Constructed once per run and passed by reference.
pub struct Host<B> {
    backend: B,
    package_manager: OnceCell<PackageManager>,
}

impl<B: Backend> Host<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            package_manager: OnceCell::new(),
        }
    }

    /// Use `manager` instead of probing the target.
    #[must_use]
    pub fn with_package_manager(backend: B, manager: Option<PackageManager>) -> Self {
        Self {
            backend,
            package_manager: OnceCell::new_with(manager),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn label(&self) -> String {
        self.backend.label()
    }

    pub fn file(&self, path: impl Into<String>) -> File<'_, B> {
        File::new(&self.backend, path.into())
    }

    pub fn package(&self, name: impl Into<String>) -> Package<'_, B> {
        Package::new(self, name.into())
    }

    pub fn service(&self, name: impl Into<String>) -> Service<'_, B> {
        Service::new(&self.backend, name.into())
    }

    pub fn user(&self, name: impl Into<String>) -> User<'_, B> {
        User::new(&self.backend, name.into())
    }

    pub fn group(&self, name: impl Into<String>) -> Group<'_, B> {
        Group::new(&self.backend, name.into())
    }

    pub fn mount_point(&self, path: impl Into<String>) -> Mount<'_, B> {
        Mount::new(&self.backend, path.into())
    }

    pub fn sysctl(&self, key: impl Into<String>) -> Sysctl<'_, B> {
        Sysctl::new(&self.backend, key.into())
    }

    /// Run an arbitrary command. A non-zero exit is data, not an error.
    ///
    /// # Errors
    ///
    /// Returns transport faults unmodified.
    pub async fn run(&self, command: &str) -> Result<CommandOutput, BackendError> {
        let output = self.backend.execute(command).await?;
        Ok(CommandOutput::from_exec(command, &output))
    }

    /// The package manager for this session, detected on first use.
    ///
    /// # Errors
    ///
    /// `Protocol` if none of the supported managers is installed.
    pub async fn package_manager(&self) -> Result<PackageManager, BackendError> {
        self.package_manager
            .get_or_try_init(|| async {
                let output = self
                    .backend
                    .execute(&PackageManager::detection_command())
                    .await?;
                let manager = PackageManager::detect(&output.stdout_lossy()).ok_or_else(|| {
                    BackendError::Protocol("no supported package manager found".to_string())
                })?;
                debug!(host = %self.label(), %manager, "detected package manager");
                Ok::<_, BackendError>(manager)
            })
            .await
            .copied()
    }

    /// Resolve one query into its snapshot.
    ///
    /// # Errors
    ///
    /// Returns backend faults unmodified.
    pub async fn inspect(&self, query: &ResourceQuery) -> Result<Snapshot, ResourceError> {
        let id = query.id.as_str();
        Ok(match query.kind {
            ResourceKind::File => Snapshot::File(self.file(id).snapshot().await?),
            ResourceKind::Package => Snapshot::Package(self.package(id).snapshot().await?),
            ResourceKind::Service => Snapshot::Service(self.service(id).snapshot().await?),
            ResourceKind::User => Snapshot::User(self.user(id).snapshot().await?),
            ResourceKind::Group => Snapshot::Group(self.group(id).snapshot().await?),
            ResourceKind::MountPoint => Snapshot::Mount(self.mount_point(id).snapshot().await?),
            ResourceKind::Sysctl => Snapshot::Sysctl(self.sysctl(id).run().await?),
            ResourceKind::Command => Snapshot::Command(self.run(id).await?),
        })
    }
}
