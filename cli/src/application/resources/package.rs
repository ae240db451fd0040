use crate::application::ports::Backend;
use crate::domain::error::BackendError;
use crate::domain::snapshot::PackageSnapshot;

use super::Host;

/// A package in the platform package database.
pub struct Package<'a, B> {
    host: &'a Host<B>,
    name: String,
}

impl<'a, B: Backend> Package<'a, B> {
    pub(super) fn new(host: &'a Host<B>, name: String) -> Self {
        Self { host, name }
    }

    /// Query the package database. A non-zero query exit means not installed.
    ///
    /// # Errors
    ///
    /// Returns backend faults unmodified, or `Protocol` if no package manager
    /// is available.
    pub async fn snapshot(&self) -> Result<PackageSnapshot, BackendError> {
        let manager = self.host.package_manager().await?;
        let output = self
            .host
            .backend()
            .execute(&manager.query_command(&self.name))
            .await?;
        Ok(manager.parse_query(&self.name, &output))
    }

    /// # Errors
    ///
    /// Same as [`Package::snapshot`].
    pub async fn is_installed(&self) -> Result<bool, BackendError> {
        Ok(self.snapshot().await?.is_installed())
    }
}
