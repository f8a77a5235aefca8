//! db_json_export library: database tables to JSON
//!
//! This library exports relational tables, or the result of one statement, to
//! JSON files. Large tables are read in keyset-paginated batches over a
//! batching column, and every table is exported by its own worker on its own
//! connection.
//!
//! # Example
//!
//! ```no_run
//! use db_json_export::{run_export, Config};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     database_url: "sqlite:./shop.db".to_string(),
//!     tables: vec!["orders".to_string()],
//!     batch_size: 5000,
//!     ..Default::default()
//! };
//!
//! let report = run_export(config, CancellationToken::new()).await?;
//! println!("Exported {} rows in {} batches",
//!          report.total_rows(), report.total_batches());
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod app;
pub mod columns;
pub mod config;
pub mod database;
pub mod error_handling;
pub mod export;
pub mod initialization;
pub mod pagination;
pub mod schema;
pub mod serialize;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel, StatsLevel};
pub use export::ExportReport;
pub use run::run_export;

// Internal run module (contains the export orchestration)
mod run {
    use anyhow::{Context, Result};
    use std::sync::Arc;
    use std::time::Instant;

    use log::info;
    use tokio_util::sync::CancellationToken;

    use crate::columns::{build_columns, ColumnSet};
    use crate::config::Config;
    use crate::database::{init_pool, SessionFactory, SqlSession, SqliteSessionFactory};
    use crate::error_handling::{ConfigError, ExportError};
    use crate::export::{
        prepare_directory, run_finish_statements, run_init_statements, Destination,
        ExportCoordinator, ExportJob, ExportReport, ExportSettings, RunContext,
    };

    /// Runs an export with the provided configuration.
    ///
    /// This is the main entry point for the library. It validates the
    /// configuration, connects to the database, runs the init statements,
    /// exports every table (or the statement) and runs the finish statements.
    ///
    /// Cancelling `cancel` stops every table before its next batch. Files
    /// already opened are closed with valid framing and the report is marked
    /// as interrupted.
    ///
    /// # Errors
    ///
    /// Fails before any table is exported if:
    /// - The configuration is contradictory or a column rule is invalid
    /// - The output directory cannot be used
    /// - The database cannot be opened or an init statement fails
    /// - A table is missing or has no usable batch column
    ///
    /// Failures while exporting a table are reported per table in the
    /// returned [`ExportReport`] instead.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use db_json_export::{run_export, Config};
    /// use tokio_util::sync::CancellationToken;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = Config {
    ///     database_url: "sqlite:./shop.db".to_string(),
    ///     ..Default::default()
    /// };
    /// let report = run_export(config, CancellationToken::new()).await?;
    /// std::process::exit(report.exit_code());
    /// # }
    /// ```
    pub async fn run_export(config: Config, cancel: CancellationToken) -> Result<ExportReport> {
        let start_time = Instant::now();

        config.validate()?;
        let columns = build_columns(&config.column_rules())?;

        if config.file.is_none() && !config.dry_run {
            prepare_directory(&config.directory).await?;
        }

        let pool = init_pool(&config.database_url, config.max_connections)
            .await
            .context("Failed to initialize database pool")?;
        let factory = Arc::new(SqliteSessionFactory::new(pool.clone()));
        let mut main = factory
            .connect()
            .await
            .context("Failed to open main database session")?;

        run_init_statements(main.as_mut(), &config.sql_init, config.stop_on_init_error)
            .await
            .context("Init statement failed")?;

        let settings = ExportSettings::from(&config);
        let mut jobs = build_jobs(&config, main.as_mut(), &columns).await?;
        for job in &mut jobs {
            job.prepare(main.as_mut(), &settings)
                .await
                .with_context(|| format!("Failed to prepare {}", job.name))?;
        }
        info!("Exporting {} table(s)", jobs.len());

        let ctx = Arc::new(RunContext::new(settings, cancel));
        let coordinator = ExportCoordinator::new(factory, Arc::clone(&ctx));
        let (tables, descriptions) = if config.dry_run {
            coordinator.dry_run(main.as_mut(), jobs).await
        } else {
            (coordinator.run(main.as_mut(), jobs).await, Vec::new())
        };

        run_finish_statements(main.as_mut(), &config.sql_finish).await;
        drop(main);
        pool.close().await;

        let report = ExportReport {
            tables,
            descriptions,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
            interrupted: ctx.is_interrupted(),
        };
        info!(
            "Exported {} rows from {} table(s) in {:.1}s",
            report.total_rows(),
            report.tables_exported(),
            report.elapsed_seconds
        );
        Ok(report)
    }

    /// One job per table (all base tables when none are named), or a single
    /// job for the statement. Each job gets its own copy of the columns.
    async fn build_jobs(
        config: &Config,
        main: &mut dyn SqlSession,
        columns: &ColumnSet,
    ) -> Result<Vec<ExportJob>, ExportError> {
        if let Some(sql) = &config.sql {
            let destination = config
                .file
                .as_deref()
                .map(Destination::from_arg)
                .ok_or(ConfigError::SqlWithoutFile)?;
            return Ok(vec![ExportJob::for_statement(
                sql,
                columns.clone(),
                destination,
            )]);
        }

        let tables = if config.tables.is_empty() {
            let tables = main.list_tables().await?;
            info!("Found {} tables", tables.len());
            tables
        } else {
            config.tables.clone()
        };
        if config.file.is_some() && tables.len() > 1 {
            return Err(ConfigError::FileWithMultipleTables.into());
        }

        Ok(tables
            .iter()
            .map(|table| {
                let destination = match &config.file {
                    Some(file) => Destination::from_arg(file),
                    None => Destination::for_table(&config.directory, table, &config.extension),
                };
                ExportJob::for_table(table, columns.clone(), destination)
            })
            .collect())
    }
}
