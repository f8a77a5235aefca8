//! Export settings and results.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::Config;
use crate::database::FetchMode;
use crate::schema::ResolveOptions;
use crate::serialize::{OutputFormat, SerializeOptions};

/// Engine settings derived from [`Config`], shared by every table of a run.
#[derive(Clone, Debug)]
pub struct ExportSettings {
    /// Array or line framing
    pub format: OutputFormat,
    /// Rows per batch, 0 for a single unbounded query
    pub batch_size: u64,
    /// Fall back to the primary key when no batch column resolves
    pub auto_batch: bool,
    /// Requested batch column
    pub batch_column: Option<String>,
    /// Extra condition ANDed to every table query
    pub where_suffix: Option<String>,
    /// Put the cache bypass hint into generated queries
    pub sql_no_cache: bool,
    /// Buffered or streamed rows
    pub fetch_mode: FetchMode,
    /// Rows per table, 0 for unlimited
    pub table_limit: u64,
    /// Rows over all tables, 0 for unlimited
    pub global_limit: u64,
    /// Type mapping options
    pub resolve: ResolveOptions,
    /// Row output options
    pub serialize: SerializeOptions,
    /// One task per table
    pub parallel: bool,
    /// Cancel the other tables after a failure
    pub stop_on_error: bool,
    /// Fail a worker whose init statement fails
    pub stop_on_init_error: bool,
    /// Statements run on each worker connection
    pub thread_init: Vec<String>,
    /// Describe instead of export
    pub dry_run: bool,
}

impl From<&Config> for ExportSettings {
    fn from(config: &Config) -> Self {
        Self {
            format: if config.array_file {
                OutputFormat::Array
            } else {
                OutputFormat::Lines
            },
            batch_size: config.batch_size,
            auto_batch: config.auto_batch,
            batch_column: config.batch_column.clone(),
            where_suffix: config.where_suffix.clone(),
            sql_no_cache: config.sql_no_cache,
            fetch_mode: if config.use_result {
                FetchMode::Streamed
            } else {
                FetchMode::Buffered
            },
            table_limit: config.table_limit,
            global_limit: config.limit,
            resolve: ResolveOptions {
                tiny1_as_bool: config.tiny1_as_bool,
                skip_empty: config.skip_empty,
            },
            serialize: SerializeOptions {
                skip_null: config.skip_null,
            },
            parallel: config.parallel,
            stop_on_error: config.stop_on_error,
            stop_on_init_error: config.stop_on_init_error,
            thread_init: config.sql_thread_init.clone(),
            dry_run: config.dry_run,
        }
    }
}

/// Outcome of one table export.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TableReport {
    /// Table name, or the output file name for a statement export
    pub name: String,
    /// Output path, `None` for stdout or a dry run
    pub output: Option<PathBuf>,
    /// Rows written
    pub rows: u64,
    /// Queries executed
    pub batches: u64,
    /// Wall time in seconds
    pub elapsed_seconds: f64,
    /// 0 on success, otherwise the failure's exit status
    pub error_code: i32,
    /// Failure message
    pub error: Option<String>,
    /// Stopped early by cancellation
    pub cancelled: bool,
}

/// Outcome of a whole run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ExportReport {
    /// Per-table results, in job order
    pub tables: Vec<TableReport>,
    /// Column descriptions produced by a dry run
    pub descriptions: Vec<String>,
    /// Wall time in seconds
    pub elapsed_seconds: f64,
    /// The run was cancelled from outside
    pub interrupted: bool,
}

impl ExportReport {
    /// Rows written over all tables.
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|t| t.rows).sum()
    }

    /// Queries executed over all tables.
    pub fn total_batches(&self) -> u64 {
        self.tables.iter().map(|t| t.batches).sum()
    }

    /// Tables that finished without error.
    pub fn tables_exported(&self) -> usize {
        self.tables.iter().filter(|t| t.error_code == 0).count()
    }

    /// Exit status of the run: the first failing table's code, or the
    /// interruption code.
    pub fn exit_code(&self) -> i32 {
        self.tables
            .iter()
            .map(|t| t.error_code)
            .find(|code| *code != 0)
            .unwrap_or(if self.interrupted {
                crate::config::EXIT_INTERRUPTED
            } else {
                0
            })
    }
}
