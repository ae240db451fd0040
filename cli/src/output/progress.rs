//! Progress display for a running check suite.

#![allow(clippy::expect_used)] // Templates are compile-time constants

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Spinner on stderr counting finished checks out of `total`.
///
/// # Panics
///
/// Panics if the template string is invalid (it is a compile-time constant and will not panic).
#[must_use]
pub fn check_counter(total: usize) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", " "])
            .template("{spinner:.cyan} [{pos}/{len}] {msg}")
            .expect("valid template"),
    );
    pb.set_message("verifying");
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
