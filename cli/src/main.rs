//! hostcheck - declarative host-state compliance checks

#![cfg_attr(test, allow(clippy::expect_used))]

use std::process::ExitCode;

use clap::Parser;
use hostcheck::cli::Cli;
use hostcheck::output::json::format_error;
use tracing_subscriber::EnvFilter;

/// Exit code for usage and setup errors raised before any check runs.
const SETUP_ERROR: u8 = 2;

/// Environment variable selecting the log filter; falls back to `RUST_LOG`.
const LOG_ENV: &str = "HOSTCHECK_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            let message = format!("{e:#}");
            match format_error(&message, "setup_error") {
                Ok(body) if json => println!("{body}"),
                _ => eprintln!("Error: {message}"),
            }
            ExitCode::from(SETUP_ERROR)
        }
    }
}
