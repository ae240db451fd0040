use crate::application::ports::Backend;
use crate::domain::error::BackendError;
use crate::domain::exec::shell_quote;
use crate::domain::snapshot::CommandOutput;

/// A kernel parameter.
pub struct Sysctl<'a, B> {
    backend: &'a B,
    key: String,
}

impl<'a, B: Backend> Sysctl<'a, B> {
    pub(super) fn new(backend: &'a B, key: String) -> Self {
        Self { backend, key }
    }

    /// Raw `sysctl KEY` output, e.g. `net.ipv4.ip_forward = 0`.
    ///
    /// # Errors
    ///
    /// Returns transport faults unmodified.
    pub async fn run(&self) -> Result<CommandOutput, BackendError> {
        let command = format!("sysctl {}", shell_quote(&self.key));
        let output = self.backend.execute(&command).await?;
        Ok(CommandOutput::from_exec(command, &output))
    }

    /// Trimmed `sysctl -n KEY` value, `None` for an unknown key.
    ///
    /// # Errors
    ///
    /// Returns transport faults unmodified.
    pub async fn value(&self) -> Result<Option<String>, BackendError> {
        let output = self
            .backend
            .execute(&format!("sysctl -n {}", shell_quote(&self.key)))
            .await?;
        Ok(output
            .success()
            .then(|| output.stdout_lossy().trim().to_string()))
    }
}
