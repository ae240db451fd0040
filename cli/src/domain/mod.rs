//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod check;
pub mod config;
pub mod error;
pub mod exec;
pub mod snapshot;
pub mod suite;
pub mod target;

pub use check::{CheckState, SkipContext, Verdict};
pub use config::{RunConfig, validate_config_key, validate_config_value};
pub use error::{BackendError, ConfigError, ResourceError, SuiteError, TargetError, TransportError};
pub use exec::{ExecOutput, FileStat};
pub use target::{Target, TargetDescriptor, parse_descriptor};
