use crate::application::ports::Backend;
use crate::domain::error::{BackendError, ResourceError};
use crate::domain::snapshot::FileSnapshot;
use crate::domain::snapshot::file::content_matches;

/// A path on the target.
pub struct File<'a, B> {
    backend: &'a B,
    path: String,
}

impl<'a, B: Backend> File<'a, B> {
    pub(super) fn new(backend: &'a B, path: String) -> Self {
        Self { backend, path }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Stat the path. A missing path is a snapshot with `exists = false`.
    ///
    /// # Errors
    ///
    /// Returns backend faults unmodified.
    pub async fn snapshot(&self) -> Result<FileSnapshot, BackendError> {
        let stat = self.backend.stat(&self.path).await?;
        Ok(FileSnapshot::from_stat(self.path.clone(), stat))
    }

    /// # Errors
    ///
    /// Returns backend faults unmodified.
    pub async fn exists(&self) -> Result<bool, BackendError> {
        Ok(self.snapshot().await?.exists)
    }

    /// Raw file content.
    ///
    /// # Errors
    ///
    /// `NotReadable` if the file is missing or unreadable; transport faults
    /// pass through.
    pub async fn content(&self) -> Result<Vec<u8>, ResourceError> {
        self.backend
            .read_file(&self.path)
            .await
            .map_err(|e| match e {
                BackendError::NotFound(_) | BackendError::PermissionDenied(_) => {
                    ResourceError::NotReadable {
                        path: self.path.clone(),
                        reason: e.to_string(),
                    }
                }
                other => ResourceError::Backend(other),
            })
    }

    /// Content decoded as lossy UTF-8.
    ///
    /// # Errors
    ///
    /// Same as [`File::content`].
    pub async fn content_string(&self) -> Result<String, ResourceError> {
        Ok(String::from_utf8_lossy(&self.content().await?).into_owned())
    }

    /// Case-sensitive literal substring match.
    ///
    /// # Errors
    ///
    /// Same as [`File::content`].
    pub async fn contains(&self, needle: &str) -> Result<bool, ResourceError> {
        Ok(self.content_string().await?.contains(needle))
    }

    /// Regular expression match; `^` and `$` anchor at line boundaries.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` for a bad regex, otherwise as [`File::content`].
    pub async fn matches(&self, pattern: &str) -> Result<bool, ResourceError> {
        content_matches(pattern, &self.content_string().await?)
    }

    /// Entry names of the directory at this path.
    ///
    /// # Errors
    ///
    /// `NotFound` if the directory does not exist.
    pub async fn list_dir(&self) -> Result<Vec<String>, BackendError> {
        self.backend.list_dir(&self.path).await
    }
}
