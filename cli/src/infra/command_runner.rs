//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution with guaranteed timeout and kill on all platforms.

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tracing::trace;

use crate::application::ports::CommandRunner;
use crate::domain::config::DEFAULT_COMMAND_TIMEOUT_SECS;
use crate::domain::error::TransportError;
use crate::domain::exec::ExecOutput;

/// Default per-command timeout.
pub const DEFAULT_CMD_TIMEOUT: Duration = Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS);

/// Exit code reported for a child terminated by a signal.
const SIGNALLED_EXIT: i32 = -1;

/// Production `CommandRunner`; uses tokio for async process execution
/// with guaranteed timeout and kill on all platforms.
///
/// `tokio::time::timeout` around `.output().await` would drop the future but
/// leave the OS process running on some platforms. This implementation uses
/// `tokio::select!` with an explicit `child.kill()`, and `kill_on_drop` covers
/// callers that cancel the whole future (run deadline).
pub struct TokioCommandRunner {
    timeout: Duration,
}

impl TokioCommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TokioCommandRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CMD_TIMEOUT)
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<ExecOutput, TransportError> {
        self.run_with_timeout(program, args, self.timeout).await
    }

    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<ExecOutput, TransportError> {
        trace!(%program, ?args, "spawning");
        let spawn_error = |e: std::io::Error| TransportError::Spawn {
            program: program.to_string(),
            reason: e.to_string(),
        };
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stdout_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                    async {
                        let mut buf = Vec::new();
                        if let Some(ref mut h) = stderr_handle {
                            let _ = h.read_to_end(&mut buf).await;
                        }
                        buf
                    },
                );
                Ok(ExecOutput {
                    exit_code: status.map_err(spawn_error)?.code().unwrap_or(SIGNALLED_EXIT),
                    stdout,
                    stderr,
                })
            } => result,
            () = tokio::time::sleep(timeout) => {
                let _ = child.kill().await;
                Err(TransportError::Timeout(timeout))
            }
        }
    }
}
