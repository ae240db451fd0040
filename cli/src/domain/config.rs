//! Domain types and validators for hostcheck configuration.
//!
//! Pure functions only; no I/O, no async, no filesystem access.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;
use crate::domain::snapshot::PackageManager;

// ── Constants ────────────────────────────────────────────────────────────────

pub const VALID_CONFIG_KEYS: &[&str] = &[
    "timeouts.command_secs",
    "run.concurrency",
    "run.deadline_secs",
    "ssh.max_sessions",
    "ssh.options",
    "packages.manager",
    "features",
];
pub const VALID_PACKAGE_MANAGERS: &[&str] = &["auto", "rpm", "dpkg", "apk", "pacman"];

pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.hostcheck/config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub timeouts: TimeoutConfig,
    pub run: RunSettings,
    pub ssh: SshConfig,
    pub packages: PackageConfig,
    /// Feature flags enabled for every run.
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-command timeout applied by every backend.
    pub command_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            command_secs: DEFAULT_COMMAND_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Checks evaluated at once. 1 runs them strictly in order.
    pub concurrency: usize,
    /// Run-wide deadline; unfinished checks become ERROR when it expires.
    pub deadline_secs: Option<u64>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            deadline_secs: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Concurrent sessions multiplexed over one SSH connection. Unset means one.
    pub max_sessions: Option<usize>,
    /// Extra `-o` options passed to `ssh`, e.g. `StrictHostKeyChecking=no`.
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    /// `auto` detects once per session; anything else forces that manager.
    pub manager: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            manager: "auto".to_string(),
        }
    }
}

impl RunConfig {
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.command_secs)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.run.deadline_secs.map(Duration::from_secs)
    }

    /// Forced package manager, `None` for auto-detection.
    #[must_use]
    pub fn package_manager(&self) -> Option<PackageManager> {
        self.packages.manager.parse().ok()
    }

    /// Set one whitelisted key from its string form.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value invalid for it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate_config_key(key)?;
        validate_config_value(key, value)?;
        match key {
            "timeouts.command_secs" => self.timeouts.command_secs = parse_positive(key, value)?,
            "run.concurrency" => self.run.concurrency = parse_positive(key, value)?,
            "run.deadline_secs" => self.run.deadline_secs = parse_optional(key, value)?,
            "ssh.max_sessions" => self.ssh.max_sessions = parse_optional(key, value)?,
            "ssh.options" => self.ssh.options = parse_list(value),
            "packages.manager" => self.packages.manager = value.to_string(),
            "features" => self.features = parse_list(value),
            _ => anyhow::bail!("Unknown setting: {key}"),
        }
        Ok(())
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a configuration key against the whitelist.
///
/// # Errors
///
/// Returns an error if the key is not in the allowed list.
pub fn validate_config_key(key: &str) -> Result<()> {
    if !VALID_CONFIG_KEYS.contains(&key) {
        return Err(ConfigError::UnknownKey {
            key: key.to_string(),
            valid: VALID_CONFIG_KEYS.join(", "),
        }
        .into());
    }
    Ok(())
}

/// Validates a configuration value for the given key.
///
/// # Errors
///
/// Returns an error if the value is not valid for the key.
pub fn validate_config_value(key: &str, value: &str) -> Result<()> {
    let invalid = |valid: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        valid: valid.to_string(),
    };
    match key {
        "timeouts.command_secs" | "run.concurrency" => {
            if !matches!(value.parse::<u64>(), Ok(n) if n > 0) {
                return Err(invalid("a positive integer").into());
            }
        }
        "run.deadline_secs" | "ssh.max_sessions" => {
            if !(value == "none" || matches!(value.parse::<u64>(), Ok(n) if n > 0)) {
                return Err(invalid("a positive integer or 'none'").into());
            }
        }
        "packages.manager" => {
            if !VALID_PACKAGE_MANAGERS.contains(&value) {
                return Err(invalid(&VALID_PACKAGE_MANAGERS.join(", ")).into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn parse_positive<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid value for {key}: {value}"))
}

fn parse_optional<T: std::str::FromStr>(key: &str, value: &str) -> Result<Option<T>> {
    if value == "none" {
        return Ok(None);
    }
    parse_positive(key, value).map(Some)
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ── Unit tests ───────────────────────────────────────────────────────────────
