//! Infrastructure implementation of the `Backend` port.
//!
//! One shell backend serves every transport: the transport only decides how a
//! shell command line is wrapped (`sh -c`, `ssh ... --`, `docker exec`). The
//! transport is fixed when the target is resolved.

use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::debug;

use crate::application::ports::{Backend, CommandRunner};
use crate::domain::config::RunConfig;
use crate::domain::error::{BackendError, TransportError};
use crate::domain::exec::{ExecOutput, FileStat, parse_stat_output, shell_quote, stat_command};
use crate::domain::target::{ContainerRuntime, SshTarget, Target};
use crate::infra::command_runner::TokioCommandRunner;

/// `ssh` exits with 255 when the connection itself failed.
const SSH_CONNECTION_FAILED: i32 = 255;

/// Backend used by the CLI.
pub type HostBackend = ShellBackend<TokioCommandRunner>;

/// How commands reach the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Local,
    Ssh {
        target: SshTarget,
        /// Extra `-o` options.
        options: Vec<String>,
    },
    Container {
        runtime: ContainerRuntime,
        name: String,
    },
}

impl Transport {
    #[must_use]
    pub fn for_target(target: &Target, config: &RunConfig) -> Self {
        match target {
            Target::Local => Self::Local,
            Target::Ssh(ssh) => Self::Ssh {
                target: ssh.clone(),
                options: config.ssh.options.clone(),
            },
            Target::Container { runtime, name } => Self::Container {
                runtime: *runtime,
                name: name.clone(),
            },
        }
    }

    /// Commands allowed in flight at once over this transport.
    #[must_use]
    pub fn sessions(&self, config: &RunConfig) -> usize {
        let sessions = match self {
            Self::Local => config.run.concurrency,
            Self::Ssh { .. } => config.ssh.max_sessions.unwrap_or(1),
            Self::Container { .. } => 1,
        };
        sessions.max(1)
    }

    /// Program and arguments that run `command` through a POSIX shell on the target.
    ///
    /// The shell always runs under the C locale; stderr and `stat` type names
    /// are matched as English text.
    #[must_use]
    pub fn argv(&self, command: &str) -> (String, Vec<String>) {
        let shell = || {
            ["LC_ALL=C", "sh", "-c", command]
                .into_iter()
                .map(str::to_string)
        };
        match self {
            Self::Local => ("env".to_string(), shell().collect()),
            Self::Ssh { target, options } => {
                let mut args = vec!["-o".to_string(), "BatchMode=yes".to_string()];
                for option in options {
                    args.push("-o".to_string());
                    args.push(option.clone());
                }
                args.push("-p".to_string());
                args.push(target.port.to_string());
                if let Some(identity) = &target.identity {
                    args.push("-i".to_string());
                    args.push(identity.display().to_string());
                }
                args.push(target.destination());
                args.push("--".to_string());
                args.push(format!("env LC_ALL=C sh -c {}", shell_quote(command)));
                ("ssh".to_string(), args)
            }
            Self::Container { runtime, name } => {
                let mut args = vec!["exec".to_string(), name.clone(), "env".to_string()];
                args.extend(shell());
                (runtime.program().to_string(), args)
            }
        }
    }

    /// Separate channel faults from the target command's own exit status.
    fn classify(&self, output: ExecOutput) -> Result<ExecOutput, TransportError> {
        match self {
            Self::Local => Ok(output),
            Self::Ssh { target, .. } if output.exit_code == SSH_CONNECTION_FAILED => {
                let stderr = output.stderr_lossy();
                let detail = format!("{}: {}", target.destination(), stderr.trim());
                Err(if stderr.contains("Permission denied") {
                    TransportError::AuthFailed(detail)
                } else if stderr.contains("Connection refused") {
                    TransportError::ConnectionRefused(detail)
                } else {
                    TransportError::Unreachable(detail)
                })
            }
            Self::Ssh { .. } => Ok(output),
            Self::Container { runtime, name } => {
                if output.success() {
                    return Ok(output);
                }
                let stderr = output.stderr_lossy();
                let daemon_fault = [
                    "Error response from daemon",
                    "No such container",
                    "no container with name or ID",
                    "Cannot connect to the Docker daemon",
                ]
                .iter()
                .any(|marker| stderr.contains(marker));
                if daemon_fault {
                    Err(TransportError::Unreachable(format!(
                        "{}://{name}: {}",
                        runtime.program(),
                        stderr.trim()
                    )))
                } else {
                    Ok(output)
                }
            }
        }
    }
}

/// `Backend` that runs every primitive as a shell command through `R`.
///
/// Each command holds one permit of the channel semaphore for its whole
/// lifetime, so a single-session transport never has two commands in flight.
pub struct ShellBackend<R> {
    runner: R,
    transport: Transport,
    channel: Semaphore,
    timeout: Duration,
    label: String,
}

impl<R: CommandRunner> ShellBackend<R> {
    #[must_use]
    pub fn new(runner: R, transport: Transport, sessions: usize, timeout: Duration) -> Self {
        let label = match &transport {
            Transport::Local => Target::Local.to_string(),
            Transport::Ssh { target, .. } => Target::Ssh(target.clone()).to_string(),
            Transport::Container { runtime, name } => Target::Container {
                runtime: *runtime,
                name: name.clone(),
            }
            .to_string(),
        };
        Self {
            runner,
            transport,
            channel: Semaphore::new(sessions.max(1)),
            timeout,
            label,
        }
    }

    /// Backend for a resolved target with settings from `config`.
    #[must_use]
    pub fn connect(runner: R, target: &Target, config: &RunConfig) -> Self {
        let transport = Transport::for_target(target, config);
        let sessions = transport.sessions(config);
        Self::new(runner, transport, sessions, config.command_timeout())
    }

    fn file_error(path: &str, command: &str, output: &ExecOutput) -> BackendError {
        let stderr = output.stderr_lossy();
        if stderr.contains("No such file or directory") || stderr.contains("Not a directory") {
            BackendError::NotFound(path.to_string())
        } else if stderr.contains("Permission denied") {
            BackendError::PermissionDenied(path.to_string())
        } else {
            BackendError::Protocol(format!(
                "{command} exited {}: {}",
                output.exit_code,
                stderr.trim()
            ))
        }
    }
}

impl<R: CommandRunner> Backend for ShellBackend<R> {
    fn label(&self) -> String {
        self.label.clone()
    }

    async fn execute(&self, command: &str) -> Result<ExecOutput, BackendError> {
        self.execute_with_timeout(command, self.timeout).await
    }

    async fn execute_with_timeout(
        &self,
        command: &str,
        timeout: Duration,
    ) -> Result<ExecOutput, BackendError> {
        let _permit = self
            .channel
            .acquire()
            .await
            .map_err(|_| BackendError::Protocol("backend channel closed".to_string()))?;
        let (program, args) = self.transport.argv(command);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self
            .runner
            .run_with_timeout(&program, &args, timeout)
            .await?;
        debug!(host = %self.label, %command, exit_code = output.exit_code, "executed");
        Ok(self.transport.classify(output)?)
    }

    async fn read_file(&self, path: &str) -> Result<Vec<u8>, BackendError> {
        let command = format!("cat -- {}", shell_quote(path));
        let output = self.execute(&command).await?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(Self::file_error(path, &command, &output))
        }
    }

    async fn stat(&self, path: &str) -> Result<FileStat, BackendError> {
        let output = self.execute(&stat_command(path)).await?;
        parse_stat_output(path, &output)
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>, BackendError> {
        let command = format!("ls -1A -- {}", shell_quote(path));
        let output = self.execute(&command).await?;
        if !output.success() {
            return Err(Self::file_error(path, &command, &output));
        }
        let mut entries: Vec<String> = output
            .stdout_lossy()
            .lines()
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        entries.sort();
        Ok(entries)
    }
}
