//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::time::Duration;

use thiserror::Error;

// ── Transport errors ──────────────────────────────────────────────────────────

/// Faults of the channel to the target. Always reported as ERROR, never retried.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("target unreachable: {0}")]
    Unreachable(String),

    #[error("failed to spawn {program}: {reason}")]
    Spawn { program: String, reason: String },

    #[error("Timeout: command exceeded {}s", .0.as_secs_f64())]
    Timeout(Duration),
}

// ── Backend errors ────────────────────────────────────────────────────────────

/// Errors returned by backend primitives.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The target answered, but not in a shape we can parse.
    #[error("malformed backend response: {0}")]
    Protocol(String),

    #[error("no such file or directory: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

// ── Resource errors ───────────────────────────────────────────────────────────

/// Errors raised by resource modules on top of backend errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("{path} is not readable: {reason}")]
    NotReadable { path: String, reason: String },

    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

// ── Target errors ─────────────────────────────────────────────────────────────

/// Errors resolving a target descriptor into a connectable target.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("invalid target descriptor '{descriptor}': {reason}")]
    Invalid { descriptor: String, reason: String },

    #[error("target '{handle}' could not be resolved: {reason}")]
    Unresolved { handle: String, reason: String },
}

// ── Suite errors ──────────────────────────────────────────────────────────────

/// Errors in a declarative check suite, raised before any check runs.
#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("cannot parse check suite: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("check #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("duplicate check name '{0}'")]
    DuplicateName(String),

    #[error("check '{check}': {reason}")]
    InvalidAssertion { check: String, reason: String },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration key/value validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown setting: {key}\n\nValid settings: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: {value}\n\nValid values: {valid}")]
    InvalidValue {
        key: String,
        value: String,
        valid: String,
    },
}
