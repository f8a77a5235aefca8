//! Configuration constants.
//!
//! Defaults for command-line options and the process exit codes.

/// Default rows per batch.
pub const DEFAULT_BATCH_SIZE: u64 = 10_000;
/// Default output directory.
pub const DEFAULT_DIRECTORY: &str = ".";
/// Default output file extension.
pub const DEFAULT_EXTENSION: &str = ".json";
/// Default database when neither `--database-url` nor `DATABASE_URL` is set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data.db";
/// Pool size; bounds how many tables are read at once.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 8;

// Exit codes
/// Invalid or contradictory options.
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Output directory or file failure.
pub const EXIT_RESOURCE_ERROR: i32 = 3;
/// Database failure without a numeric driver code.
pub const EXIT_DATABASE_ERROR: i32 = 4;
/// NULL batching value.
pub const EXIT_DATA_ERROR: i32 = 5;
/// Cancelled by Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;
