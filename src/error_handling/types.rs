use std::path::PathBuf;

use log::SetLoggerError;
use thiserror::Error;

use crate::config::{
    EXIT_CONFIG_ERROR, EXIT_DATABASE_ERROR, EXIT_DATA_ERROR, EXIT_RESOURCE_ERROR,
};

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error opening the log file or configuring the log target.
    #[error("Logger setup error: {0}")]
    LoggerSetupError(String),
}

/// Contradictory or unusable options, detected before any row is exported.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `--sql` was combined with explicit table names.
    #[error("Either one or more tables or an SQL statement may be given, but not both")]
    TablesAndSql,

    /// `--file` was given while exporting more than one table.
    #[error("An output file may only be given when exporting a single table")]
    FileWithMultipleTables,

    /// `--sql` without `--file`.
    #[error("An SQL statement export requires an output file")]
    SqlWithoutFile,

    /// `--sql-where-suffix` cannot be applied to a user statement.
    #[error("A WHERE suffix cannot be combined with an SQL statement export")]
    SqlWithWhereSuffix,

    /// Batching is requested, auto-detection is off and no column was named.
    #[error("A batch column must be given when batch column auto detection is disabled")]
    BatchColumnRequired,

    /// A batch column was named while batching is disabled.
    #[error("Batch column {0} requires a batch size > 0")]
    BatchSizeRequired(String),

    /// Increment on a column without a fixed value.
    #[error("Column increment for {0} requires a fixed value for the same column")]
    IncrementWithoutFixedValue(String),

    /// Increment step or the fixed value it applies to is not an integer.
    #[error("Column increment for {0} must be an integer applied to an integer value")]
    IncrementNotInteger(String),

    /// The named batch column is not part of the table.
    #[error("Batch column {column} not found in {table}")]
    BatchColumnNotFound {
        /// Requested batch column
        column: String,
        /// Table or statement name
        table: String,
    },

    /// No primary key to paginate on, with auto-detection off.
    #[error("No primary key column found in {0}; a batch column must be specified")]
    NoPrimaryKey(String),

    /// Composite primary key, with auto-detection off.
    #[error("More than one primary key column in {0}; a batch column must be specified")]
    MultiplePrimaryKeys(String),

    /// The table does not exist or has no columns.
    #[error("Table {0} not found")]
    TableNotFound(String),

    /// Every column of the table is skipped.
    #[error("{0} has no columns to export")]
    NoColumns(String),

    /// A `name=value` option without the `=`.
    #[error("Invalid option value '{0}': expected name=value")]
    InvalidKeyValue(String),

    /// The output directory exists but is not a directory.
    #[error("Output path {0} is not a directory")]
    NotADirectory(PathBuf),

    /// The output directory is read-only.
    #[error("Output directory {0} is not writable")]
    DirectoryNotWritable(PathBuf),
}

/// Errors raised by the database capability.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Opening the pool or acquiring a connection failed.
    #[error("Failed to connect to database: {0}")]
    ConnectError(#[source] sqlx::Error),

    /// A statement failed. Carries the statement text.
    #[error("SQL error: {source}\n  SQL: {sql}")]
    SqlError {
        /// Offending statement
        sql: String,
        /// Driver error
        #[source]
        source: sqlx::Error,
    },
}

impl DatabaseError {
    /// Wraps a driver error together with the statement that produced it.
    pub fn sql(sql: impl Into<String>, source: sqlx::Error) -> Self {
        DatabaseError::SqlError {
            sql: sql.into(),
            source,
        }
    }

    /// Numeric error code reported by the database, when it has one.
    pub fn driver_code(&self) -> Option<i32> {
        let source = match self {
            DatabaseError::ConnectError(e) => e,
            DatabaseError::SqlError { source, .. } => source,
        };
        match source {
            sqlx::Error::Database(db) => db
                .code()
                .and_then(|code| code.parse::<i32>().ok())
                .filter(|code| *code != 0),
            _ => None,
        }
    }
}

/// Failures of a single table export or of the run as a whole.
#[derive(Error, Debug)]
pub enum ExportError {
    /// Invalid options.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Database failure.
    #[error(transparent)]
    Database(#[from] DatabaseError),

    /// Output directory or file failure.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory involved
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The batching column was NULL on the last row of a batch.
    #[error("NULL value in batch column {column} of {table} after {rows} rows; cannot continue")]
    NullBatchValue {
        /// Table or statement name
        table: String,
        /// Batch column name
        column: String,
        /// Rows written before the failure
        rows: u64,
    },

    /// An incrementing fixed column ran past the integer range.
    #[error("Fixed column {column} cannot be incremented past {last}")]
    IncrementOverflow {
        /// Fixed column name
        column: String,
        /// Last value written
        last: i64,
    },

    /// A worker task panicked or was aborted.
    #[error("Export task for {table} failed: {message}")]
    TaskFailed {
        /// Table or statement name
        table: String,
        /// Join error text
        message: String,
    },
}

impl ExportError {
    /// Builds an I/O error for `path`.
    pub fn io(path: impl std::fmt::Display, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.to_string(),
            source,
        }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExportError::Config(_) => EXIT_CONFIG_ERROR,
            ExportError::Database(e) => e.driver_code().unwrap_or(EXIT_DATABASE_ERROR),
            ExportError::Io { .. } | ExportError::TaskFailed { .. } => EXIT_RESOURCE_ERROR,
            ExportError::NullBatchValue { .. } | ExportError::IncrementOverflow { .. } => {
                EXIT_DATA_ERROR
            }
        }
    }
}

/// Maps an application error chain to a process exit status.
///
/// Walks the chain looking for one of the crate's typed errors; anything else
/// is reported as a resource failure.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<ExportError>() {
            return e.exit_code();
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return EXIT_CONFIG_ERROR;
        }
        if let Some(e) = cause.downcast_ref::<DatabaseError>() {
            return e.driver_code().unwrap_or(EXIT_DATABASE_ERROR);
        }
        if cause.downcast_ref::<InitializationError>().is_some() {
            return EXIT_RESOURCE_ERROR;
        }
    }
    EXIT_RESOURCE_ERROR
}
