//! Application initialization.
//!
//! Logger setup for the binary and for library users that want the same
//! output format.

mod logger;

// Re-export public API
pub use logger::{init_logger_to_file, init_logger_with};
