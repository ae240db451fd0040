//! Report types shared by hostcheck renderers and consumers of its JSON output.

pub mod types;

pub use types::*;
