//! Command output snapshot.

use serde::Serialize;

use crate::domain::exec::ExecOutput;

/// Output of a command run on the target, decoded as lossy UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOutput {
    pub command: String,
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn from_exec(command: impl Into<String>, output: &ExecOutput) -> Self {
        Self {
            command: command.into(),
            exit_code: output.exit_code,
            stdout: output.stdout_lossy(),
            stderr: output.stderr_lossy(),
        }
    }

    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}
