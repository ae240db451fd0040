//! User and group snapshots parsed from `getent` and `id` output.

use serde::Serialize;

use crate::domain::error::BackendError;
use crate::domain::exec::{ExecOutput, shell_quote};

/// `getent` exit status for "key not found in database".
const GETENT_NOT_FOUND: i32 = 2;

/// User account at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSnapshot {
    pub name: String,
    pub exists: bool,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub gecos: String,
    pub home: String,
    pub shell: String,
    /// Names of all groups the user belongs to, primary group first.
    pub groups: Vec<String>,
}

impl UserSnapshot {
    #[must_use]
    pub fn absent(name: &str) -> Self {
        Self {
            name: name.to_string(),
            exists: false,
            uid: None,
            gid: None,
            gecos: String::new(),
            home: String::new(),
            shell: String::new(),
            groups: Vec::new(),
        }
    }
}

/// Group at query time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSnapshot {
    pub name: String,
    pub exists: bool,
    pub gid: Option<u32>,
    pub members: Vec<String>,
}

#[must_use]
pub fn passwd_command(name: &str) -> String {
    format!("getent passwd {}", shell_quote(name))
}

#[must_use]
pub fn groups_command(name: &str) -> String {
    format!("id -Gn {}", shell_quote(name))
}

#[must_use]
pub fn group_command(name: &str) -> String {
    format!("getent group {}", shell_quote(name))
}

/// Parse `getent passwd NAME`. `Ok(None)` when the user does not exist.
///
/// # Errors
///
/// `Protocol` for unexpected exit codes or malformed entries.
pub fn parse_passwd(name: &str, output: &ExecOutput) -> Result<Option<UserSnapshot>, BackendError> {
    let Some(line) = getent_line(output, "passwd")? else {
        return Ok(None);
    };
    let fields: Vec<&str> = line.split(':').collect();
    let [_, _, uid, gid, gecos, home, shell] = fields.as_slice() else {
        return Err(BackendError::Protocol(format!(
            "malformed passwd entry for {name}: {line:?}"
        )));
    };
    Ok(Some(UserSnapshot {
        name: name.to_string(),
        exists: true,
        uid: Some(parse_id(uid, "uid")?),
        gid: Some(parse_id(gid, "gid")?),
        gecos: (*gecos).to_string(),
        home: (*home).to_string(),
        shell: (*shell).to_string(),
        groups: Vec::new(),
    }))
}

/// Parse `id -Gn NAME` into group names.
///
/// # Errors
///
/// `Protocol` if `id` fails for a user that `getent` reported.
pub fn parse_groups(name: &str, output: &ExecOutput) -> Result<Vec<String>, BackendError> {
    if !output.success() {
        return Err(BackendError::Protocol(format!(
            "id -Gn {name} exited {}: {}",
            output.exit_code,
            output.stderr_lossy().trim()
        )));
    }
    Ok(output
        .stdout_lossy()
        .split_whitespace()
        .map(str::to_string)
        .collect())
}

/// Parse `getent group NAME`.
///
/// # Errors
///
/// `Protocol` for unexpected exit codes or malformed entries.
pub fn parse_group(name: &str, output: &ExecOutput) -> Result<GroupSnapshot, BackendError> {
    let Some(line) = getent_line(output, "group")? else {
        return Ok(GroupSnapshot {
            name: name.to_string(),
            exists: false,
            gid: None,
            members: Vec::new(),
        });
    };
    let fields: Vec<&str> = line.split(':').collect();
    let [_, _, gid, members] = fields.as_slice() else {
        return Err(BackendError::Protocol(format!(
            "malformed group entry for {name}: {line:?}"
        )));
    };
    Ok(GroupSnapshot {
        name: name.to_string(),
        exists: true,
        gid: Some(parse_id(gid, "gid")?),
        members: members
            .split(',')
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

fn getent_line(output: &ExecOutput, database: &str) -> Result<Option<String>, BackendError> {
    match output.exit_code {
        0 => Ok(output
            .stdout_lossy()
            .lines()
            .next()
            .map(|l| l.trim_end().to_string())),
        GETENT_NOT_FOUND => Ok(None),
        code => Err(BackendError::Protocol(format!(
            "getent {database} exited {code}: {}",
            output.stderr_lossy().trim()
        ))),
    }
}

fn parse_id(s: &str, what: &str) -> Result<u32, BackendError> {
    s.parse::<u32>()
        .map_err(|e| BackendError::Protocol(format!("invalid {what} '{s}': {e}")))
}
