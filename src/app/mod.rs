//! Main application modules.
//!
//! Interrupt handling and end-of-run statistics used by the binary.

pub mod shutdown;
pub mod statistics;

// Re-export public API
pub use shutdown::watch_for_interrupt;
pub use statistics::{format_statistics, print_statistics};
