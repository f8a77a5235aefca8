//! Configuration types.
//!
//! This module defines the enums used by command-line parsing and the library
//! [`Config`] struct the export run is driven by.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::columns::ColumnRules;
use crate::config::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_DATABASE_URL, DEFAULT_DIRECTORY, DEFAULT_EXTENSION,
    DEFAULT_MAX_CONNECTIONS,
};
use crate::error_handling::ConfigError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Statistics printed when the run ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatsLevel {
    /// Nothing
    None,
    /// One summary line
    Normal,
    /// One line per table plus the summary
    Full,
    /// The whole report as a single JSON object
    Json,
}

/// Library configuration (no CLI dependencies).
///
/// This is the core configuration struct used by the library. It can be
/// constructed programmatically without any CLI dependencies.
///
/// # Examples
///
/// ```no_run
/// use db_json_export::Config;
/// use std::path::PathBuf;
///
/// let config = Config {
///     database_url: "sqlite:./shop.db".to_string(),
///     tables: vec!["orders".to_string()],
///     directory: PathBuf::from("out"),
///     batch_size: 5000,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Database connection URL
    pub database_url: String,
    /// Pool size, bounding how many tables are read at once
    pub max_connections: u32,

    /// Tables to export; all base tables when empty and no `sql` is given
    pub tables: Vec<String>,
    /// Statement to export instead of tables
    pub sql: Option<String>,
    /// Condition ANDed to every generated table query
    pub where_suffix: Option<String>,

    /// Single output file (`-` for stdout)
    pub file: Option<PathBuf>,
    /// Output directory for per-table files
    pub directory: PathBuf,
    /// Extension of per-table files
    pub extension: String,
    /// Write one JSON array instead of one object per line
    pub array_file: bool,

    /// Keyset pagination column
    pub batch_column: Option<String>,
    /// Rows per batch, 0 to read each table with one query
    pub batch_size: u64,
    /// Use a single-column primary key when no batch column resolves
    pub auto_batch: bool,
    /// Rows over all tables, 0 for unlimited
    pub limit: u64,
    /// Rows per table, 0 for unlimited
    pub table_limit: u64,

    /// `--col-value name=value`
    pub column_values: Vec<(String, String)>,
    /// `--col-incr name=step`
    pub column_increments: Vec<(String, String)>,
    /// `--col-json-name name=key`
    pub column_json_names: Vec<(String, String)>,
    /// Columns left out of the output
    pub skip_columns: Vec<String>,
    /// Columns always written as strings
    pub quoted_columns: Vec<String>,
    /// Columns always written raw
    pub unquoted_columns: Vec<String>,

    /// Leave empty strings out
    pub skip_empty: bool,
    /// Leave NULLs out
    pub skip_null: bool,
    /// Write `TINYINT(1)` / `BOOLEAN` columns as true/false
    pub tiny1_as_bool: bool,
    /// Stream rows instead of buffering each batch
    pub use_result: bool,
    /// Put the cache bypass hint into generated queries
    pub sql_no_cache: bool,
    /// One task per table
    pub parallel: bool,
    /// Describe the columns instead of exporting
    pub dry_run: bool,
    /// Cancel other tables after a failure
    pub stop_on_error: bool,
    /// Treat failing init statements as fatal
    pub stop_on_init_error: bool,

    /// Statements run on the main connection before exporting
    pub sql_init: Vec<String>,
    /// Statements run on every worker connection
    pub sql_thread_init: Vec<String>,
    /// Statements run after all tables are exported
    pub sql_finish: Vec<String>,

    /// End of run statistics
    pub stats: StatsLevel,
    /// Log level
    pub log_level: LogLevel,
    /// Log format
    pub log_format: LogFormat,
    /// Append logs to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            tables: Vec::new(),
            sql: None,
            where_suffix: None,
            file: None,
            directory: PathBuf::from(DEFAULT_DIRECTORY),
            extension: DEFAULT_EXTENSION.to_string(),
            array_file: false,
            batch_column: None,
            batch_size: DEFAULT_BATCH_SIZE,
            auto_batch: true,
            limit: 0,
            table_limit: 0,
            column_values: Vec::new(),
            column_increments: Vec::new(),
            column_json_names: Vec::new(),
            skip_columns: Vec::new(),
            quoted_columns: Vec::new(),
            unquoted_columns: Vec::new(),
            skip_empty: false,
            skip_null: false,
            tiny1_as_bool: false,
            use_result: false,
            sql_no_cache: true,
            parallel: true,
            dry_run: false,
            stop_on_error: true,
            stop_on_init_error: true,
            sql_init: Vec::new(),
            sql_thread_init: Vec::new(),
            sql_finish: Vec::new(),
            stats: StatsLevel::Normal,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            log_file: None,
        }
    }
}

impl Config {
    /// Checks option combinations that are contradictory before anything
    /// touches the database.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sql.is_some() && !self.tables.is_empty() {
            return Err(ConfigError::TablesAndSql);
        }
        if self.file.is_some() && self.tables.len() > 1 {
            return Err(ConfigError::FileWithMultipleTables);
        }
        if self.sql.is_some() && self.file.is_none() {
            return Err(ConfigError::SqlWithoutFile);
        }
        if self.sql.is_some() && self.where_suffix.is_some() {
            return Err(ConfigError::SqlWithWhereSuffix);
        }
        if !self.auto_batch && self.batch_column.is_none() && self.batch_size > 0 {
            return Err(ConfigError::BatchColumnRequired);
        }
        if let (Some(column), 0) = (&self.batch_column, self.batch_size) {
            return Err(ConfigError::BatchSizeRequired(column.clone()));
        }
        Ok(())
    }

    /// Column rules in the form the column model consumes.
    pub fn column_rules(&self) -> ColumnRules {
        ColumnRules {
            fixed_values: self.column_values.clone(),
            increments: self.column_increments.clone(),
            json_names: self.column_json_names.clone(),
            skip: self.skip_columns.clone(),
            quoted: self.quoted_columns.clone(),
            unquoted: self.unquoted_columns.clone(),
            batch_column: self.batch_column.clone(),
        }
    }
}
