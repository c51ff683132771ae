//! Core shared library for the Covenant workspace.
//!
//! This crate exposes the reusable primitives the other crates depend on:
//! the canonical error type, configuration loading, database abstractions
//! and logging setup.

pub mod config;
pub mod db;
pub mod errors;
pub mod logging;
pub mod serde_utils;

pub use errors::{CovenantError, Result as CoreResult};
