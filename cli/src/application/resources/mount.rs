use crate::application::ports::Backend;
use crate::domain::error::BackendError;
use crate::domain::snapshot::MountPoint;
use crate::domain::snapshot::mount::{MOUNT_TABLE, find_mount, parse_mounts};

/// A mount point, looked up in the kernel mount table.
pub struct Mount<'a, B> {
    backend: &'a B,
    path: String,
}

impl<'a, B: Backend> Mount<'a, B> {
    pub(super) fn new(backend: &'a B, path: String) -> Self {
        Self { backend, path }
    }

    /// The effective mount at this path, `None` if nothing is mounted there.
    ///
    /// # Errors
    ///
    /// Returns backend faults unmodified, including an unreadable mount table.
    pub async fn snapshot(&self) -> Result<Option<MountPoint>, BackendError> {
        let table = self.backend.read_file(MOUNT_TABLE).await?;
        let mounts = parse_mounts(&String::from_utf8_lossy(&table));
        Ok(find_mount(&mounts, &self.path).cloned())
    }

    /// # Errors
    ///
    /// Same as [`Mount::snapshot`].
    pub async fn is_mounted(&self) -> Result<bool, BackendError> {
        Ok(self.snapshot().await?.is_some())
    }
}
