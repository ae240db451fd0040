//! Raw backend value types and the pure helpers that build and parse them.

use serde::Serialize;

use crate::domain::error::BackendError;

/// Captured result of one command on the target. A non-zero exit is data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ExecOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    #[must_use]
    pub fn stdout_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    #[must_use]
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Path metadata as reported by the target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct FileStat {
    pub exists: bool,
    pub is_file: bool,
    pub is_dir: bool,
    pub is_symlink: bool,
    pub owner: String,
    pub group: String,
    /// Permission bits, 0..=0o7777.
    pub mode: u32,
    pub size: u64,
}

impl FileStat {
    /// Stat result for a path that does not exist.
    #[must_use]
    pub fn missing() -> Self {
        Self::default()
    }
}

/// `stat` format producing one `owner|group|octal-mode|type|size` line.
///
/// Fields describe the link target; [`stat_command`] appends a second line
/// saying whether the path itself is a symlink.
pub const STAT_FORMAT: &str = "%U|%G|%a|%F|%s";

/// Quote `arg` for a POSIX shell.
#[must_use]
pub fn shell_quote(arg: &str) -> String {
    if !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c))
    {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Marker line [`stat_command`] prints when `path` is itself a symlink.
const SYMLINK_MARKER: &str = "link";

/// Build the `stat` command for `path`.
///
/// The target is examined through `-L`, so a dangling link reports as missing.
#[must_use]
pub fn stat_command(path: &str) -> String {
    let path = shell_quote(path);
    format!(
        "stat -L -c {} -- {path} && if test -h {path}; then echo {SYMLINK_MARKER}; else echo plain; fi",
        shell_quote(STAT_FORMAT),
    )
}

/// Parse an octal permission string (`"644"`, `"0644"`, `"4755"`) into 0..=0o7777.
///
/// # Errors
///
/// Returns a message if the string is not octal or exceeds 0o7777.
pub fn parse_mode(s: &str) -> Result<u32, String> {
    let digits = s.trim().trim_start_matches("0o");
    let mode = u32::from_str_radix(digits, 8).map_err(|e| format!("invalid mode '{s}': {e}"))?;
    if mode > 0o7777 {
        return Err(format!("mode '{s}' out of range (max 7777)"));
    }
    Ok(mode)
}

/// Interpret the output of [`stat_command`].
///
/// A missing path is a valid `exists = false` result.
///
/// # Errors
///
/// `PermissionDenied` if the path cannot be examined, `Protocol` if the
/// output is malformed.
pub fn parse_stat_output(path: &str, output: &ExecOutput) -> Result<FileStat, BackendError> {
    if !output.success() {
        let stderr = output.stderr_lossy();
        if stderr.contains("No such file or directory") || stderr.contains("Not a directory") {
            return Ok(FileStat::missing());
        }
        if stderr.contains("Permission denied") {
            return Err(BackendError::PermissionDenied(path.to_string()));
        }
        return Err(BackendError::Protocol(format!(
            "stat {path} exited {}: {}",
            output.exit_code,
            stderr.trim()
        )));
    }

    let stdout = output.stdout_lossy();
    let mut lines = stdout.lines();
    let line = lines.next().unwrap_or_default();
    let is_symlink = lines.next().is_some_and(|l| l.trim() == SYMLINK_MARKER);
    let fields: Vec<&str> = line.split('|').collect();
    let [owner, group, mode, kind, size] = fields.as_slice() else {
        return Err(BackendError::Protocol(format!(
            "unexpected stat output for {path}: {line:?}"
        )));
    };
    let mode = parse_mode(mode).map_err(BackendError::Protocol)?;
    let size = size
        .trim()
        .parse::<u64>()
        .map_err(|e| BackendError::Protocol(format!("invalid size in stat output: {e}")))?;

    Ok(FileStat {
        exists: true,
        is_file: kind.starts_with("regular"),
        is_dir: *kind == "directory",
        is_symlink,
        owner: (*owner).to_string(),
        group: (*group).to_string(),
        mode,
        size,
    })
}
