use crate::application::ports::Backend;
use crate::domain::error::BackendError;
use crate::domain::snapshot::ServiceSnapshot;
use crate::domain::snapshot::service::{
    is_active_command, is_enabled_command, parse_is_active, parse_is_enabled,
};

/// A systemd unit.
pub struct Service<'a, B> {
    backend: &'a B,
    name: String,
}

impl<'a, B: Backend> Service<'a, B> {
    pub(super) fn new(backend: &'a B, name: String) -> Self {
        Self { backend, name }
    }

    /// # Errors
    ///
    /// `Protocol` if `systemctl` is missing; transport faults pass through.
    pub async fn is_running(&self) -> Result<bool, BackendError> {
        let output = self.backend.execute(&is_active_command(&self.name)).await?;
        Ok(parse_is_active(&output)?.0)
    }

    /// # Errors
    ///
    /// Same as [`Service::is_running`].
    pub async fn is_enabled(&self) -> Result<bool, BackendError> {
        let output = self.backend.execute(&is_enabled_command(&self.name)).await?;
        Ok(parse_is_enabled(&output)?.0)
    }

    /// Both states, from two separate calls. An absent unit is not an error.
    ///
    /// # Errors
    ///
    /// Same as [`Service::is_running`].
    pub async fn snapshot(&self) -> Result<ServiceSnapshot, BackendError> {
        let active = self.backend.execute(&is_active_command(&self.name)).await?;
        let (running, active_state) = parse_is_active(&active)?;
        let enabled = self.backend.execute(&is_enabled_command(&self.name)).await?;
        let (enabled, unit_file_state, load_state) = parse_is_enabled(&enabled)?;
        Ok(ServiceSnapshot {
            name: self.name.clone(),
            running,
            enabled,
            load_state,
            active_state,
            unit_file_state,
        })
    }
}
