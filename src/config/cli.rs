//! Command-line options.

use std::path::PathBuf;

use clap::Parser;

use super::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_DATABASE_URL, DEFAULT_DIRECTORY, DEFAULT_EXTENSION,
    DEFAULT_MAX_CONNECTIONS,
};
use super::types::{Config, LogFormat, LogLevel, StatsLevel};
use crate::error_handling::ConfigError;

/// Parses a `name=value` argument.
///
/// The value may itself contain `=`; only the first one separates.
pub fn parse_key_value(arg: &str) -> Result<(String, String), ConfigError> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(ConfigError::InvalidKeyValue(arg.to_string())),
    }
}

/// Command-line options.
///
/// # Examples
///
/// ```bash
/// # Every table of the database, one file per table in ./out
/// db_json_export --database-url sqlite:./shop.db --directory out
///
/// # Two tables in batches of 5000 rows, as JSON arrays
/// db_json_export orders customers --batch-size 5000 --array-file
///
/// # A statement to stdout
/// db_json_export --sql "SELECT id, name FROM customers%W%O" --file - --batch-col id
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "db_json_export",
    version,
    about = "Exports database tables or a query result to JSON files in keyset-paginated batches."
)]
pub struct Opt {
    /// Tables to export (default: all base tables)
    #[arg(value_name = "TABLE")]
    pub tables: Vec<String>,

    /// Database URL
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    /// Maximum number of database connections (tables read at once)
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    /// Statement to export instead of tables. Supports %w, %W, %O, %o and %%.
    #[arg(long)]
    pub sql: Option<String>,

    /// Condition added to every table query's WHERE clause
    #[arg(long)]
    pub sql_where_suffix: Option<String>,

    /// Output file for a single table or statement (- for stdout)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Output directory for per-table files
    #[arg(long, default_value = DEFAULT_DIRECTORY)]
    pub directory: PathBuf,

    /// Extension of per-table files
    #[arg(long, default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Write a JSON array instead of one object per line
    #[arg(long)]
    pub array_file: bool,

    /// Batching column (default: the single-column primary key)
    #[arg(long)]
    pub batch_col: Option<String>,

    /// Rows per batch (0 reads each table with one query)
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: u64,

    /// Do not fall back to the primary key when no batch column resolves
    #[arg(long)]
    pub skip_auto_batch: bool,

    /// Maximum rows over all tables (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub limit: u64,

    /// Maximum rows per table (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    pub table_limit: u64,

    /// Fixed column value, name=value (repeatable)
    #[arg(long, value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub col_value: Vec<(String, String)>,

    /// Increment for a fixed integer column, name=step (repeatable)
    #[arg(long, value_name = "NAME=STEP", value_parser = parse_key_value)]
    pub col_incr: Vec<(String, String)>,

    /// JSON key for a column, name=key (repeatable)
    #[arg(long, value_name = "NAME=KEY", value_parser = parse_key_value)]
    pub col_json_name: Vec<(String, String)>,

    /// Column to leave out (repeatable)
    #[arg(long, value_name = "NAME")]
    pub skip_col: Vec<String>,

    /// Column always written as a JSON string (repeatable)
    #[arg(long, value_name = "NAME")]
    pub col_quoted: Vec<String>,

    /// Column always written raw (repeatable)
    #[arg(long, value_name = "NAME")]
    pub col_unquoted: Vec<String>,

    /// Leave out empty string values
    #[arg(long)]
    pub skip_empty: bool,

    /// Leave out NULL values
    #[arg(long)]
    pub skip_null: bool,

    /// Write TINYINT(1) and BOOLEAN columns as true/false
    #[arg(long)]
    pub tiny1_as_bool: bool,

    /// Stream rows from the database instead of buffering each batch
    #[arg(long)]
    pub use_result: bool,

    /// Omit the SQL_NO_CACHE hint
    #[arg(long)]
    pub skip_sql_no_cache: bool,

    /// Export tables one after another
    #[arg(long)]
    pub skip_parallel: bool,

    /// Print the resolved columns instead of exporting
    #[arg(long)]
    pub dryrun: bool,

    /// Keep exporting other tables after a failure
    #[arg(long)]
    pub skip_stop_on_error: bool,

    /// Ignore failing init statements
    #[arg(long)]
    pub skip_stop_on_init_error: bool,

    /// Statement run before exporting (repeatable)
    #[arg(long, value_name = "SQL")]
    pub sql_init: Vec<String>,

    /// Statement run on every worker connection (repeatable)
    #[arg(long, value_name = "SQL")]
    pub sql_thread_init: Vec<String>,

    /// Statement run after exporting (repeatable)
    #[arg(long, value_name = "SQL")]
    pub sql_finish: Vec<String>,

    /// Statistics: none|normal|full|json
    #[arg(long, value_enum, default_value_t = StatsLevel::Normal)]
    pub stats: StatsLevel,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        Config {
            database_url: opt.database_url,
            max_connections: opt.max_connections,
            tables: opt.tables,
            sql: opt.sql,
            where_suffix: opt.sql_where_suffix,
            file: opt.file,
            directory: opt.directory,
            extension: opt.extension,
            array_file: opt.array_file,
            batch_column: opt.batch_col,
            batch_size: opt.batch_size,
            auto_batch: !opt.skip_auto_batch,
            limit: opt.limit,
            table_limit: opt.table_limit,
            column_values: opt.col_value,
            column_increments: opt.col_incr,
            column_json_names: opt.col_json_name,
            skip_columns: opt.skip_col,
            quoted_columns: opt.col_quoted,
            unquoted_columns: opt.col_unquoted,
            skip_empty: opt.skip_empty,
            skip_null: opt.skip_null,
            tiny1_as_bool: opt.tiny1_as_bool,
            use_result: opt.use_result,
            sql_no_cache: !opt.skip_sql_no_cache,
            parallel: !opt.skip_parallel,
            dry_run: opt.dryrun,
            stop_on_error: !opt.skip_stop_on_error,
            stop_on_init_error: !opt.skip_stop_on_init_error,
            sql_init: opt.sql_init,
            sql_thread_init: opt.sql_thread_init,
            sql_finish: opt.sql_finish,
            stats: opt.stats,
            log_level: opt.log_level,
            log_format: opt.log_format,
            log_file: opt.log_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("src=erp"),
            Ok(("src".to_string(), "erp".to_string()))
        );
        assert_eq!(
            parse_key_value("expr=a=b"),
            Ok(("expr".to_string(), "a=b".to_string()))
        );
        assert_eq!(parse_key_value("empty="), Ok(("empty".to_string(), String::new())));
        assert_eq!(
            parse_key_value("novalue"),
            Err(ConfigError::InvalidKeyValue("novalue".into()))
        );
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_defaults_match_library_config() {
        let opt = Opt::try_parse_from(["db_json_export", "--database-url", "sqlite:x.db"])
            .expect("parses");
        let config = Config::from(opt);
        let expected = Config {
            database_url: "sqlite:x.db".into(),
            ..Default::default()
        };
        assert_eq!(config, expected);
    }

    #[test]
    fn test_full_command_line() {
        let opt = Opt::try_parse_from([
            "db_json_export",
            "orders",
            "customers",
            "--database-url",
            "sqlite:shop.db",
            "--batch-size",
            "2",
            "--batch-col",
            "id",
            "--col-value",
            "src=erp",
            "--col-value",
            "seq=1",
            "--col-incr",
            "seq=1",
            "--skip-col",
            "secret",
            "--array-file",
            "--skip-parallel",
            "--skip-sql-no-cache",
            "--stats",
            "full",
        ])
        .expect("parses");
        let config = Config::from(opt);
        assert_eq!(config.tables, vec!["orders".to_string(), "customers".to_string()]);
        assert_eq!(config.batch_size, 2);
        assert_eq!(config.batch_column.as_deref(), Some("id"));
        assert_eq!(config.column_values.len(), 2);
        assert_eq!(config.column_increments, vec![("seq".to_string(), "1".to_string())]);
        assert_eq!(config.skip_columns, vec!["secret".to_string()]);
        assert!(config.array_file);
        assert!(!config.parallel);
        assert!(!config.sql_no_cache);
        assert_eq!(config.stats, StatsLevel::Full);
    }

    #[test]
    fn test_invalid_key_value_rejected_by_parser() {
        let result = Opt::try_parse_from(["db_json_export", "--col-value", "oops"]);
        assert!(result.is_err());
    }
}
