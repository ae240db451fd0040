//! `hostcheck verify`: run a check suite against a target.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use hostcheck_common::CheckStatus;

use crate::app::AppContext;
use crate::application::ports::ConfigStore;
use crate::application::services::runner::{RunOptions, run_checks};
use crate::application::services::suite::SuiteCheck;
use crate::commands::{TargetArgs, open_host};
use crate::domain::check::SkipContext;
use crate::domain::config::RunConfig;
use crate::domain::suite::parse_suite;
use crate::output::TerminalReporter;

/// Arguments for the verify command.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// YAML check suite
    pub suite: PathBuf,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Enable a feature flag for `requires:` checks (repeatable)
    #[arg(long = "feature", value_name = "FLAG")]
    pub features: Vec<String>,

    /// Checks evaluated at once
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub concurrency: Option<u64>,

    /// Run-wide deadline in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub deadline: Option<u64>,

    /// Only list checks with these statuses (comma separated)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub show: Vec<CheckStatus>,

    /// Print error details under each result
    #[arg(short, long)]
    pub verbose: bool,
}

impl VerifyArgs {
    /// Fold command-line overrides into the loaded configuration.
    fn apply(&self, config: &mut RunConfig) {
        if let Some(concurrency) = self.concurrency {
            config.run.concurrency = usize::try_from(concurrency).unwrap_or(usize::MAX);
        }
        if let Some(deadline) = self.deadline {
            config.run.deadline_secs = Some(deadline);
        }
        for feature in &self.features {
            if !config.features.contains(feature) {
                config.features.push(feature.clone());
            }
        }
    }
}

/// Run the verify command.
///
/// # Errors
///
/// Returns an error for setup failures: unreadable or invalid suite,
/// unresolvable target, broken configuration.
pub async fn run(app: &AppContext, args: &VerifyArgs) -> Result<ExitCode> {
    let mut config = app.config_store.load()?;
    args.apply(&mut config);

    let text = std::fs::read_to_string(&args.suite)
        .with_context(|| format!("cannot read suite {}", args.suite.display()))?;
    let suite = parse_suite(&text, |name| std::env::var(name).ok())
        .with_context(|| format!("invalid suite {}", args.suite.display()))?;
    let checks = SuiteCheck::from_suite(suite);
    if checks.is_empty() && !app.is_json() {
        app.output.warn("suite declares no checks");
    }

    let host = open_host(&args.target, &config).await?;
    let options = RunOptions {
        concurrency: config.run.concurrency,
        deadline: config.deadline(),
        skip: SkipContext::with_features(config.features.iter().cloned()),
    };

    let reporter = TerminalReporter::new(&app.output, checks.len(), !app.is_json());
    let summary = run_checks(&host, &checks, &options, &reporter).await;
    reporter.finish();

    app.renderer()
        .render_summary(&summary, &args.show, args.verbose)?;

    Ok(if summary.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
