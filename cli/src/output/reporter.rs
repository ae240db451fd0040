//! `TerminalReporter`: Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so the runner can emit progress events without depending on any
//! presentation type directly.

use hostcheck_common::CheckResult;
use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// On a TTY it drives a spinner on stderr, counting finished checks. Without a
/// TTY, in quiet mode, or for JSON output it stays silent apart from warnings.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: Option<ProgressBar>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a reporter for a run of `total` checks.
    #[must_use]
    pub fn new(ctx: &'a OutputContext, total: usize, enabled: bool) -> Self {
        let spinner = (enabled && ctx.show_progress()).then(|| progress::check_counter(total));
        Self { ctx, spinner }
    }

    /// Remove the spinner before the summary is printed.
    pub fn finish(&self) {
        if let Some(pb) = &self.spinner {
            pb.finish_and_clear();
        }
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        if let Some(pb) = &self.spinner {
            pb.set_message(message.to_string());
        }
    }

    fn check_finished(&self, _result: &CheckResult) {
        if let Some(pb) = &self.spinner {
            pb.inc(1);
        }
    }

    fn warn(&self, message: &str) {
        if self.ctx.quiet {
            return;
        }
        let line = format!("  {} {message}", "!".style(self.ctx.styles.warning));
        match &self.spinner {
            Some(pb) => pb.println(line),
            None => eprintln!("{line}"),
        }
    }
}
