use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal outcome of one check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum CheckStatus {
    Pass,
    Fail,
    Skip,
    Error,
}

impl CheckStatus {
    /// Whether this status makes the whole run fail.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Fail | Self::Error)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Skip => "SKIP",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown check status '{0}' (expected pass, fail, skip or error)")]
pub struct ParseStatusError(pub String);

impl FromStr for CheckStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pass" => Ok(Self::Pass),
            "fail" => Ok(Self::Fail),
            "skip" => Ok(Self::Skip),
            "error" => Ok(Self::Error),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

/// Outcome of one declared check. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckResult {
    pub id: String,
    pub status: CheckStatus,
    /// Human-readable message, rendered verbatim.
    pub message: String,
    /// Captured fault detail (cause chain or panic payload) for ERROR results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
}

impl CheckResult {
    #[must_use]
    pub fn pass(id: impl Into<String>, message: impl Into<String>, duration: Duration) -> Self {
        Self::new(id, CheckStatus::Pass, message, None, duration)
    }

    #[must_use]
    pub fn fail(id: impl Into<String>, message: impl Into<String>, duration: Duration) -> Self {
        Self::new(id, CheckStatus::Fail, message, None, duration)
    }

    #[must_use]
    pub fn skip(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(id, CheckStatus::Skip, reason, None, Duration::ZERO)
    }

    #[must_use]
    pub fn error(
        id: impl Into<String>,
        message: impl Into<String>,
        detail: Option<String>,
        duration: Duration,
    ) -> Self {
        Self::new(id, CheckStatus::Error, message, detail, duration)
    }

    fn new(
        id: impl Into<String>,
        status: CheckStatus,
        message: impl Into<String>,
        detail: Option<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: id.into(),
            status,
            message: message.into(),
            detail,
            duration,
        }
    }
}

/// Per-status counts of a run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub pass: usize,
    pub fail: usize,
    pub skip: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: CheckStatus) {
        match status {
            CheckStatus::Pass => self.pass += 1,
            CheckStatus::Fail => self.fail += 1,
            CheckStatus::Skip => self.skip += 1,
            CheckStatus::Error => self.error += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.pass + self.fail + self.skip + self.error
    }
}

/// Ordered results of one run plus aggregate counts. Created once per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Display label of the verified target.
    pub target: String,
    pub started_at: DateTime<Utc>,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    pub counts: StatusCounts,
    /// Results in declaration order.
    pub results: Vec<CheckResult>,
}

impl RunSummary {
    /// Build a summary from results already in declaration order.
    #[must_use]
    pub fn new(
        target: impl Into<String>,
        started_at: DateTime<Utc>,
        duration: Duration,
        results: Vec<CheckResult>,
    ) -> Self {
        let mut counts = StatusCounts::default();
        for result in &results {
            counts.record(result.status);
        }
        Self {
            target: target.into(),
            started_at,
            duration,
            counts,
            results,
        }
    }

    /// `true` when no result is FAIL or ERROR.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.counts.fail == 0 && self.counts.error == 0
    }

    /// Process exit code: 0 iff the run succeeded.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_success())
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
