//! Library half of the `fxquinox` inspection tool.
//!
//! Exposed separately from `main.rs` so integration tests can drive the
//! commands without spawning a process.

pub mod commands;
pub mod config;
pub mod logging;
pub mod payload;
