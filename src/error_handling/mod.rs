//! Error types and exit status mapping.
//!
//! Errors are grouped by what went wrong:
//! - **Configuration**: contradictory options, detected before rows are exported
//! - **Resource**: output directory or file failures
//! - **Database**: statement failures, carrying the SQL text
//! - **Data**: a NULL batching value where the cursor must advance
//!
//! Each maps to a process exit status via [`ExportError::exit_code`].

mod types;

// Re-export public API
pub use types::{exit_code_for, ConfigError, DatabaseError, ExportError, InitializationError};
