//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`; never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use hostcheck_common::CheckResult;

use crate::domain::config::RunConfig;
use crate::domain::error::{BackendError, TargetError, TransportError};
use crate::domain::exec::{ExecOutput, FileStat};
use crate::domain::target::Target;

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output with the default timeout.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<ExecOutput, TransportError>;
    /// Run a program with a custom timeout override.
    ///
    /// A non-zero exit status is a successful run. Only a failed spawn or an
    /// exceeded `timeout` are errors.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Spawn` if the process cannot be spawned, or
    /// `TransportError::Timeout` if it exceeds `timeout`. On timeout, the child
    /// process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<ExecOutput, TransportError>;
}

// ── Backend Port ──────────────────────────────────────────────────────────────

/// Uniform, read-only command and file access to one target.
///
/// Callers never learn which transport is active.
#[allow(async_fn_in_trait)]
pub trait Backend {
    /// Display label of the target for reports.
    fn label(&self) -> String;
    /// Run a shell command with the backend's default timeout.
    async fn execute(&self, command: &str) -> Result<ExecOutput, BackendError>;
    /// Run a shell command with a per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Transport` on channel faults or timeout. A
    /// non-zero exit code is returned as `Ok`.
    async fn execute_with_timeout(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, BackendError>;
    /// Read a whole file.
    ///
    /// # Errors
    ///
    /// `NotFound` or `PermissionDenied` for unreadable paths.
    async fn read_file(&self, path: &str) -> Result<Vec<u8>, BackendError>;
    /// Stat a path. A missing path yields `exists = false`.
    async fn stat(&self, path: &str) -> Result<FileStat, BackendError>;
    /// Entry names of a directory, sorted.
    ///
    /// # Errors
    ///
    /// `NotFound` if the directory does not exist.
    async fn list_dir(&self, path: &str) -> Result<Vec<String>, BackendError>;
}

// ── Inventory Port ────────────────────────────────────────────────────────────

/// Resolves an inventory handle (host or group name) into a connectable target.
#[allow(async_fn_in_trait)]
pub trait InventoryProvider {
    /// # Errors
    ///
    /// Returns `TargetError::Unresolved` if the handle is unknown or the
    /// inventory cannot be read.
    async fn resolve(&self, handle: &str) -> Result<Target, TargetError>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait; no async needed.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// A check reached a terminal status.
    fn check_finished(&self, result: &CheckResult);
    /// Emit a warning message.
    fn warn(&self, message: &str);
}

// ── Configuration Port ────────────────────────────────────────────────────────

/// Abstracts configuration persistence.
pub trait ConfigStore {
    /// Load the configuration, or defaults if none is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self) -> Result<RunConfig>;
    /// Persist the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    fn save(&self, config: &RunConfig) -> Result<()>;
    /// Location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    fn path(&self) -> Result<PathBuf>;
}
