//! File snapshot.

use regex::RegexBuilder;
use serde::Serialize;

use crate::domain::error::ResourceError;
use crate::domain::exec::FileStat;

/// Metadata of one path at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct FileSnapshot {
    pub path: String,
    pub exists: bool,
    pub is_file: bool,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub owner: String,
    pub group: String,
    /// Permission bits, 0..=0o7777. Zero when the path does not exist.
    pub mode: u32,
    pub size: u64,
}

impl FileSnapshot {
    #[must_use]
    pub fn from_stat(path: impl Into<String>, stat: FileStat) -> Self {
        Self {
            path: path.into(),
            exists: stat.exists,
            is_file: stat.is_file,
            is_dir: stat.is_dir,
            is_symlink: stat.is_symlink,
            owner: stat.owner,
            group: stat.group,
            mode: stat.mode,
            size: stat.size,
        }
    }

    /// Any execute bit set.
    #[must_use]
    pub fn is_executable(&self) -> bool {
        self.exists && self.mode & 0o111 != 0
    }

    /// Mode rendered the way `ls`/`stat` users write it, e.g. `0644`.
    #[must_use]
    pub fn mode_octal(&self) -> String {
        format!("{:04o}", self.mode)
    }
}

/// Regular expression match over file content; `^` and `$` anchor at line
/// boundaries.
///
/// # Errors
///
/// `InvalidPattern` if `pattern` does not compile.
pub fn content_matches(pattern: &str, content: &str) -> Result<bool, ResourceError> {
    let re = RegexBuilder::new(pattern)
        .multi_line(true)
        .build()
        .map_err(|e| ResourceError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
    Ok(re.is_match(content))
}
