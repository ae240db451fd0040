//! Human-readable terminal renderer.

use std::path::Path;
use std::time::Duration;

use hostcheck_common::{CheckResult, CheckStatus, RunSummary, StatusCounts};
use owo_colors::OwoColorize as _;
use serde_json::Value;

use crate::domain::config::RunConfig;
use crate::domain::snapshot::{ResourceQuery, Snapshot};
use crate::infra::config::CONFIG_ENV;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        if self.ctx.quiet {
            return;
        }
        println!("hostcheck {version}");
    }

    /// Render a run summary.
    ///
    /// `show` limits the per-check lines to the given statuses; the counts
    /// line always covers every result. In quiet mode only FAIL and ERROR
    /// lines are printed.
    pub fn render_summary(&self, summary: &RunSummary, show: &[CheckStatus], verbose: bool) {
        if !self.ctx.quiet {
            println!();
            println!(
                "  {}",
                format!("Verifying {}", summary.target).style(self.ctx.styles.header)
            );
            println!();
        }

        for result in &summary.results {
            let visible = if self.ctx.quiet {
                result.status.is_failure()
            } else {
                show.is_empty() || show.contains(&result.status)
            };
            if visible {
                self.print_result(result, verbose);
            }
        }

        if !self.ctx.quiet {
            println!();
            let style = if summary.is_success() {
                self.ctx.styles.success
            } else {
                self.ctx.styles.error
            };
            println!(
                "  {}",
                format_counts(&summary.counts, summary.duration).style(style)
            );
            println!();
        }
    }

    fn print_result(&self, result: &CheckResult, verbose: bool) {
        let style = self.ctx.styles.status(result.status);
        println!(
            "  {} {:<5} {}: {}",
            status_glyph(result.status).style(style),
            result.status.as_str().style(style),
            result.id.style(self.ctx.styles.bold),
            result.message
        );
        if verbose {
            if let Some(detail) = &result.detail {
                for line in detail.lines() {
                    println!("          {}", line.style(self.ctx.styles.dim));
                }
            }
        }
    }

    /// Render one resource snapshot as aligned key/value lines.
    pub fn render_snapshot(&self, query: &ResourceQuery, target: &str, snapshot: &Snapshot) {
        println!();
        println!(
            "  {}",
            format!("{query} on {target}").style(self.ctx.styles.header)
        );
        println!();
        let fields = snapshot_fields(snapshot);
        if fields.is_empty() {
            println!("  {}", "not a mount point".style(self.ctx.styles.dim));
        }
        let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 1;
        for (key, value) in fields {
            println!("  {:<width$} {value}", format!("{key}:").style(self.ctx.styles.dim));
        }
        println!();
    }

    /// Render the current hostcheck configuration.
    pub fn render_config(&self, config: &RunConfig, path: &Path) {
        println!();
        println!(
            "  {}",
            format!("Configuration ({})", path.display()).style(self.ctx.styles.header)
        );
        println!();
        let deadline = config
            .run
            .deadline_secs
            .map_or_else(|| "none".to_string(), |s| s.to_string());
        let sessions = config
            .ssh
            .max_sessions
            .map_or_else(|| "none".to_string(), |s| s.to_string());
        println!("  {:<24} {}", "timeouts.command_secs:", config.timeouts.command_secs);
        println!("  {:<24} {}", "run.concurrency:", config.run.concurrency);
        println!("  {:<24} {deadline}", "run.deadline_secs:");
        println!("  {:<24} {sessions}", "ssh.max_sessions:");
        println!("  {:<24} {}", "ssh.options:", config.ssh.options.join(","));
        println!("  {:<24} {}", "packages.manager:", config.packages.manager);
        println!("  {:<24} {}", "features:", config.features.join(","));
        println!();
        println!("  {}", "Environment:".style(self.ctx.styles.bold));
        println!(
            "    {:<18} {}",
            format!("{CONFIG_ENV}:"),
            std::env::var(CONFIG_ENV).unwrap_or_else(|_| "(not set)".to_string())
        );
        println!(
            "    {:<18} {}",
            "NO_COLOR:",
            std::env::var("NO_COLOR").unwrap_or_else(|_| "(not set)".to_string())
        );
        println!();
    }
}

// ── Display helpers (used by tests and output layer) ─────────────────────────

#[must_use]
pub fn status_glyph(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "\u{2713}",
        CheckStatus::Fail => "\u{2717}",
        CheckStatus::Skip => "-",
        CheckStatus::Error => "!",
    }
}

/// `3 passed, 1 failed, 0 skipped, 1 error in 2.31s`
#[must_use]
pub fn format_counts(counts: &StatusCounts, duration: Duration) -> String {
    let errors = if counts.error == 1 { "error" } else { "errors" };
    format!(
        "{} passed, {} failed, {} skipped, {} {errors} in {:.2}s",
        counts.pass,
        counts.fail,
        counts.skip,
        counts.error,
        duration.as_secs_f64()
    )
}

/// Top-level fields of a snapshot as display strings, sorted by key.
#[must_use]
pub fn snapshot_fields(snapshot: &Snapshot) -> Vec<(String, String)> {
    let Ok(Value::Object(tagged)) = serde_json::to_value(snapshot) else {
        return Vec::new();
    };
    let Some(Value::Object(fields)) = tagged.get("snapshot") else {
        return Vec::new();
    };
    fields
        .iter()
        .map(|(key, value)| (key.clone(), display_value(key, value)))
        .collect()
}

fn display_value(key: &str, value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.trim_end().to_string(),
        Value::Number(n) if key == "mode" => n
            .as_u64()
            .map_or_else(|| n.to_string(), |m| format!("{m:04o}")),
        Value::Array(items) => items
            .iter()
            .map(|v| display_value(key, v))
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
