//! Unit tests for the hostcheck CLI
//!
//! These tests use mocked ports and run fast without touching a real target.

mod architecture;
mod mocks;
mod resources;
mod shell_backend;
