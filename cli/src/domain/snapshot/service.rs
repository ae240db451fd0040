//! Service snapshot built from two independent `systemctl` queries.

use serde::Serialize;

use crate::domain::error::BackendError;
use crate::domain::exec::{ExecOutput, shell_quote};

/// Exit code of a shell for "command not found".
const COMMAND_NOT_FOUND: i32 = 127;

/// Whether the unit is known to the service manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    Loaded,
    NotFound,
}

/// Service state at query time.
///
/// `running` and `enabled` come from separate calls; the raw states are kept
/// so "disabled", "static" and "absent" stay distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSnapshot {
    pub name: String,
    pub running: bool,
    pub enabled: bool,
    pub load_state: LoadState,
    /// Raw `systemctl is-active` answer (`active`, `inactive`, `failed`, ...).
    pub active_state: String,
    /// Raw `systemctl is-enabled` answer (`enabled`, `disabled`, `static`, ...).
    pub unit_file_state: String,
}

impl ServiceSnapshot {
    #[must_use]
    pub fn exists(&self) -> bool {
        self.load_state == LoadState::Loaded
    }
}

#[must_use]
pub fn is_active_command(name: &str) -> String {
    format!("systemctl is-active {}", shell_quote(name))
}

#[must_use]
pub fn is_enabled_command(name: &str) -> String {
    format!("systemctl is-enabled {}", shell_quote(name))
}

/// Parse `systemctl is-active`. Returns `(running, raw state)`.
///
/// # Errors
///
/// `Protocol` if `systemctl` is not available on the target.
pub fn parse_is_active(output: &ExecOutput) -> Result<(bool, String), BackendError> {
    ensure_systemctl(output)?;
    let state = first_line(output);
    let running = output.success() && state == "active";
    Ok((running, if state.is_empty() { "unknown".to_string() } else { state }))
}

/// Parse `systemctl is-enabled`. Returns `(enabled, raw state, load state)`.
///
/// # Errors
///
/// `Protocol` if `systemctl` is not available on the target.
pub fn parse_is_enabled(output: &ExecOutput) -> Result<(bool, String, LoadState), BackendError> {
    ensure_systemctl(output)?;
    let state = first_line(output);
    let stderr = output.stderr_lossy();
    let missing = state == "not-found"
        || (state.is_empty()
            && (stderr.contains("No such file or directory")
                || stderr.contains("not found")
                || stderr.contains("could not be found")));
    if missing {
        return Ok((false, "not-found".to_string(), LoadState::NotFound));
    }
    let enabled = output.success() && (state == "enabled" || state == "enabled-runtime");
    Ok((enabled, state, LoadState::Loaded))
}

fn ensure_systemctl(output: &ExecOutput) -> Result<(), BackendError> {
    if output.exit_code == COMMAND_NOT_FOUND {
        return Err(BackendError::Protocol(
            "systemctl is not available on the target".to_string(),
        ));
    }
    Ok(())
}

fn first_line(output: &ExecOutput) -> String {
    output
        .stdout_lossy()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}
