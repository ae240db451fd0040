//! Check lifecycle and verdict types.
//!
//! Pure data; the runner drives the state machine, checks fill verdicts.

use std::collections::BTreeSet;
use std::fmt::Display;

use hostcheck_common::CheckStatus;
use thiserror::Error;

// ── Lifecycle ─────────────────────────────────────────────────────────────────

/// Per-check state machine: PENDING → RUNNING → terminal, or PENDING → SKIP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Pending,
    Running,
    Finished(CheckStatus),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid check transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: CheckState,
    pub to: CheckState,
}

impl CheckState {
    /// Move to `next`, rejecting transitions the lifecycle does not allow.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` for anything other than
    /// PENDING→RUNNING, PENDING→SKIP, or RUNNING→{PASS, FAIL, ERROR}.
    pub fn advance(self, next: CheckState) -> Result<CheckState, InvalidTransition> {
        use CheckState::{Finished, Pending, Running};
        let allowed = match (self, next) {
            (Pending, Running | Finished(CheckStatus::Skip)) => true,
            (Running, Finished(status)) => status != CheckStatus::Skip,
            _ => false,
        };
        if allowed {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

// ── Skip predicates ───────────────────────────────────────────────────────────

/// Run-wide inputs to skip predicates. Evaluated before a check starts.
#[derive(Debug, Clone, Default)]
pub struct SkipContext {
    /// Enabled feature flags.
    pub features: BTreeSet<String>,
}

impl SkipContext {
    #[must_use]
    pub fn with_features<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            features: features.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn is_enabled(&self, feature: &str) -> bool {
        self.features.contains(feature)
    }

    /// Skip reason for a check requiring `required` features, if any is off.
    #[must_use]
    pub fn missing_feature<'a>(&self, required: &'a [String]) -> Option<&'a str> {
        required
            .iter()
            .find(|f| !self.is_enabled(f))
            .map(String::as_str)
    }
}

// ── Verdicts ──────────────────────────────────────────────────────────────────

/// One evaluated expectation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assertion {
    pub description: String,
    pub passed: bool,
}

/// Assertions collected by one check run.
///
/// All hold → PASS; any false → FAIL listing every failed assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    assertions: Vec<Assertion>,
}

impl Verdict {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a boolean expectation.
    pub fn check(&mut self, passed: bool, description: impl Into<String>) -> &mut Self {
        self.assertions.push(Assertion {
            description: description.into(),
            passed,
        });
        self
    }

    /// Record `actual == expected`; the failure text names both values.
    pub fn check_eq<T>(&mut self, what: &str, actual: &T, expected: &T) -> &mut Self
    where
        T: PartialEq + Display + ?Sized,
    {
        let passed = actual == expected;
        let description = if passed {
            format!("{what} is {expected}")
        } else {
            format!("{what}: expected {expected}, got {actual}")
        };
        self.check(passed, description)
    }

    #[must_use]
    pub fn assertions(&self) -> &[Assertion] {
        &self.assertions
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.assertions.iter().all(|a| a.passed)
    }

    /// Failed assertions joined by `; `, or `None` when everything held.
    #[must_use]
    pub fn failure_message(&self) -> Option<String> {
        let failed: Vec<&str> = self
            .assertions
            .iter()
            .filter(|a| !a.passed)
            .map(|a| a.description.as_str())
            .collect();
        (!failed.is_empty()).then(|| failed.join("; "))
    }
}
