//! Application configuration and constants.
//!
//! This module provides:
//! - Defaults and exit codes
//! - CLI option parsing (`Opt`)
//! - The library `Config` and its validation

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{parse_key_value, Opt};
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, StatsLevel};
