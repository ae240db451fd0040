//! Application service: target resolution.

use tracing::debug;

use crate::application::ports::InventoryProvider;
use crate::domain::error::TargetError;
use crate::domain::target::{Target, TargetDescriptor, parse_descriptor};

/// Turn a descriptor string into a connectable target.
///
/// Inventory handles go through `inventory`; every other form is parsed
/// directly and never touches it.
///
/// # Errors
///
/// `TargetError::Invalid` for a malformed descriptor, `Unresolved` if the
/// inventory cannot resolve the handle.
pub async fn resolve_target(
    descriptor: &str,
    inventory: &impl InventoryProvider,
) -> Result<Target, TargetError> {
    let target = match parse_descriptor(descriptor)? {
        TargetDescriptor::Direct(target) => target,
        TargetDescriptor::Inventory(handle) => inventory.resolve(&handle).await?,
    };
    debug!(%descriptor, %target, "resolved target");
    Ok(target)
}
