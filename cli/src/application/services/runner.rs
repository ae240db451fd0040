//! Application service: assertion runner.
//!
//! Drives every check through PENDING → RUNNING → terminal, isolating faults
//! so one check's error or panic never affects another.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use futures_util::{FutureExt, StreamExt, stream};
use hostcheck_common::{CheckResult, CheckStatus, RunSummary};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::application::ports::{Backend, ProgressReporter};
use crate::application::resources::Host;
use crate::domain::check::{CheckState, SkipContext, Verdict};

/// A verifiable check.
///
/// Implemented directly by code checks and by declarative suite entries.
#[allow(async_fn_in_trait)]
pub trait Check {
    /// Unique identifier, reported verbatim.
    fn id(&self) -> &str;

    /// Message reported on PASS.
    fn description(&self) -> Option<&str> {
        None
    }

    /// Reason to skip, evaluated before the check runs. Must not touch the target.
    fn skip_reason(&self, _ctx: &SkipContext) -> Option<String> {
        None
    }

    /// Evaluate the check's assertions against `host`.
    ///
    /// A false assertion goes into the verdict. An `Err` ends the check with
    /// ERROR.
    async fn verify<B: Backend>(&self, host: &Host<B>) -> Result<Verdict>;
}

/// Run-wide settings.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Checks in flight at once. Clamped to at least 1.
    pub concurrency: usize,
    /// Checks unfinished when this elapses become ERROR "Timeout".
    pub deadline: Option<Duration>,
    pub skip: SkipContext,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            deadline: None,
            skip: SkipContext::default(),
        }
    }
}

/// Run `checks` against `host` and collect results in declaration order.
pub async fn run_checks<B, C>(
    host: &Host<B>,
    checks: &[C],
    options: &RunOptions,
    reporter: &impl ProgressReporter,
) -> RunSummary
where
    B: Backend,
    C: Check,
{
    let started_at = Utc::now();
    let start = Instant::now();
    let deadline = options.deadline.map(|d| start + d);
    info!(
        host = %host.label(),
        checks = checks.len(),
        concurrency = options.concurrency,
        "starting run"
    );

    let results: Vec<CheckResult> = stream::iter(
        checks
            .iter()
            .map(|check| run_one(host, check, &options.skip, deadline, reporter)),
    )
    .buffered(options.concurrency.max(1))
    .collect()
    .await;

    let summary = RunSummary::new(host.label(), started_at, start.elapsed(), results);
    info!(
        pass = summary.counts.pass,
        fail = summary.counts.fail,
        skip = summary.counts.skip,
        error = summary.counts.error,
        "run finished"
    );
    summary
}

async fn run_one<B, C>(
    host: &Host<B>,
    check: &C,
    ctx: &SkipContext,
    deadline: Option<Instant>,
    reporter: &impl ProgressReporter,
) -> CheckResult
where
    B: Backend,
    C: Check,
{
    let id = check.id();
    let mut state = CheckState::Pending;

    if let Some(reason) = check.skip_reason(ctx) {
        transition(id, &mut state, CheckState::Finished(CheckStatus::Skip));
        let result = CheckResult::skip(id, reason);
        reporter.check_finished(&result);
        return result;
    }

    transition(id, &mut state, CheckState::Running);
    let started = Instant::now();
    // A check dequeued after the deadline never reaches the target.
    let outcome = match deadline {
        Some(at) if started >= at => None,
        Some(at) => {
            reporter.step(&format!("checking {id}..."));
            let guarded = AssertUnwindSafe(check.verify(host)).catch_unwind();
            tokio::time::timeout_at(at, guarded).await.ok()
        }
        None => {
            reporter.step(&format!("checking {id}..."));
            Some(AssertUnwindSafe(check.verify(host)).catch_unwind().await)
        }
    };
    let elapsed = started.elapsed();

    let result = match outcome {
        None => CheckResult::error(
            id,
            "Timeout",
            Some("run deadline exceeded before the check finished".to_string()),
            elapsed,
        ),
        Some(Err(payload)) => CheckResult::error(
            id,
            format!("check panicked: {}", panic_message(payload.as_ref())),
            None,
            elapsed,
        ),
        Some(Ok(Err(err))) => {
            CheckResult::error(id, err.to_string(), Some(format!("{err:#}")), elapsed)
        }
        Some(Ok(Ok(verdict))) => match verdict.failure_message() {
            None => CheckResult::pass(id, pass_message(check, &verdict), elapsed),
            Some(failures) => CheckResult::fail(id, failures, elapsed),
        },
    };
    if result.status == CheckStatus::Error {
        warn!(check = id, message = %result.message, "check errored");
        reporter.warn(&format!("{id}: {}", result.message));
    }
    transition(id, &mut state, CheckState::Finished(result.status));
    reporter.check_finished(&result);
    result
}

fn transition(id: &str, state: &mut CheckState, next: CheckState) {
    match state.advance(next) {
        Ok(advanced) => {
            debug!(check = id, from = ?*state, to = ?advanced, "check transition");
            *state = advanced;
        }
        Err(err) => warn!(check = id, %err, "ignored check transition"),
    }
}

fn pass_message<C: Check>(check: &C, verdict: &Verdict) -> String {
    check.description().map_or_else(
        || format!("{} assertion(s) passed", verdict.assertions().len()),
        str::to_string,
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
