use std::time::Instant;

use log::{debug, info, warn};

use super::output::Destination;
use super::types::ExportSettings;
use crate::columns::ColumnSet;
use crate::database::{QueryResult, SqlSession};
use crate::error_handling::{ConfigError, ExportError};
use crate::pagination::{
    build_table_template, materialize, select_batch_column, BatchCursor, BatchLimit,
};
use crate::schema::{register_table_columns, resolve_result_columns, FieldMeta};

/// What a job reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobSource {
    /// A table, queried with a generated statement.
    Table(String),
    /// A user statement, used as the query template.
    Statement(String),
}

/// Export of one table or statement. Owned by exactly one worker.
#[derive(Clone, Debug)]
pub struct ExportJob {
    /// Table name, or the destination for a statement export
    pub name: String,
    /// Table or statement
    pub source: JobSource,
    /// Output destination
    pub destination: Destination,
    /// This job's copy of the column list
    pub columns: ColumnSet,
    /// Declared columns of the table, or of the one table a statement reads
    pub declared: Vec<FieldMeta>,
    /// SQL with placeholders
    pub query_template: String,
    /// Last SQL sent to the database
    pub materialized_query: String,
    /// Index of the batching column in `columns`
    pub batch_column: Option<usize>,
    /// Rows per batch, 0 when not paginating
    pub batch_size: u64,
    /// Rows written
    pub rows_emitted: u64,
    /// Queries executed
    pub batches_emitted: u64,
    /// When the export started
    pub started: Option<Instant>,
    /// When the export ended
    pub finished: Option<Instant>,
}

impl ExportJob {
    fn new(name: String, source: JobSource, columns: ColumnSet, destination: Destination) -> Self {
        let query_template = match &source {
            JobSource::Statement(sql) => sql.clone(),
            JobSource::Table(_) => String::new(),
        };
        Self {
            name,
            source,
            destination,
            columns,
            declared: Vec::new(),
            query_template,
            materialized_query: String::new(),
            batch_column: None,
            batch_size: 0,
            rows_emitted: 0,
            batches_emitted: 0,
            started: None,
            finished: None,
        }
    }

    /// A table export.
    pub fn for_table(table: &str, columns: ColumnSet, destination: Destination) -> Self {
        Self::new(
            table.to_string(),
            JobSource::Table(table.to_string()),
            columns,
            destination,
        )
    }

    /// A statement export, named after its destination.
    pub fn for_statement(sql: &str, columns: ColumnSet, destination: Destination) -> Self {
        Self::new(
            destination.to_string(),
            JobSource::Statement(sql.to_string()),
            columns,
            destination,
        )
    }

    /// Whether this job reads a user statement.
    pub fn is_statement(&self) -> bool {
        matches!(self.source, JobSource::Statement(_))
    }

    /// Seconds between start and end, or until now while running.
    pub fn elapsed_seconds(&self) -> f64 {
        match (self.started, self.finished) {
            (Some(start), Some(end)) => end.duration_since(start).as_secs_f64(),
            (Some(start), None) => start.elapsed().as_secs_f64(),
            _ => 0.0,
        }
    }

    /// Expands the template for the next batch and stores it in
    /// `materialized_query`.
    pub fn materialize(&mut self, limit: BatchLimit, where_suffix: Option<&str>) -> &str {
        let cursor = self.batch_column.and_then(|i| self.columns.get(i)).map(|c| BatchCursor {
            column: &c.name,
            last_value: c.previous_cursor_value.as_deref(),
            quote_value: c.needs_quoted_literal(),
        });
        let sql = materialize(&self.query_template, cursor.as_ref(), where_suffix, limit.rows());
        self.materialized_query = sql;
        &self.materialized_query
    }

    /// Reads the schema, chooses the batching column and builds the query
    /// template.
    ///
    /// # Errors
    ///
    /// Configuration errors for a missing table, an unresolvable batch column
    /// or nothing to select; database errors from the schema queries.
    pub async fn prepare(
        &mut self,
        session: &mut dyn SqlSession,
        settings: &ExportSettings,
    ) -> Result<(), ExportError> {
        match self.source.clone() {
            JobSource::Table(table) => self.prepare_table(session, settings, &table).await?,
            JobSource::Statement(_) => self.prepare_statement(session, settings).await?,
        }
        self.batch_size = if self.batch_column.is_some() {
            settings.batch_size
        } else {
            0
        };
        debug!(
            "Prepared {}: batch column {:?}, batch size {}",
            self.name,
            self.batch_column.map(|i| self.columns[i].name.as_str()),
            self.batch_size
        );
        Ok(())
    }

    async fn prepare_table(
        &mut self,
        session: &mut dyn SqlSession,
        settings: &ExportSettings,
        table: &str,
    ) -> Result<(), ExportError> {
        let declared = session.describe_table(table).await?;
        if declared.is_empty() {
            return Err(ConfigError::TableNotFound(table.to_string()).into());
        }
        register_table_columns(&mut self.columns, &declared);
        self.declared = declared;

        if settings.batch_size > 0 {
            self.batch_column = select_batch_column(
                &mut self.columns,
                table,
                settings.batch_column.as_deref(),
                settings.auto_batch,
            )?;
        }
        self.query_template = build_table_template(table, &self.columns, settings.sql_no_cache)?;
        Ok(())
    }

    /// Statement columns are only known from a result, so a one-row query
    /// resolves them before a batch column can be chosen.
    ///
    /// Result fields carry no key information. When the statement reads a
    /// single base table, that table's declaration supplies key flags and
    /// declared types for result columns of the same name.
    async fn prepare_statement(
        &mut self,
        session: &mut dyn SqlSession,
        settings: &ExportSettings,
    ) -> Result<(), ExportError> {
        if settings.batch_size == 0 {
            return Ok(());
        }
        let first_row = materialize(&self.query_template, None, None, 1);
        info!("Resolving statement columns for {}", self.name);
        let QueryResult { fields, rows } = session.query(&first_row, settings.fetch_mode).await?;
        drop(rows);

        if !fields.iter().any(|f| f.primary_key) {
            if let [table] = session.source_tables(&first_row).await?.as_slice() {
                debug!("{} reads only {}", self.name, table);
                self.declared = session.describe_table(table).await?;
            }
        }
        let fields = merge_declared(&fields, &self.declared);
        resolve_result_columns(&mut self.columns, &fields, &settings.resolve);

        self.batch_column = select_batch_column(
            &mut self.columns,
            &self.name,
            settings.batch_column.as_deref(),
            settings.auto_batch,
        )?;
        if self.batch_column.is_none() {
            warn!(
                "No single primary key column in the result of {}; exporting it in one query",
                self.name
            );
        }
        Ok(())
    }
}

/// Overlays declared column types onto result fields of the same name.
///
/// Result metadata can be coarser than the declaration (a `TINYINT(1)` column
/// reports as a plain integer), so declared types win when known.
pub fn merge_declared(fields: &[FieldMeta], declared: &[FieldMeta]) -> Vec<FieldMeta> {
    fields
        .iter()
        .map(|field| {
            match declared
                .iter()
                .find(|d| d.name.eq_ignore_ascii_case(&field.name))
            {
                Some(d) => FieldMeta {
                    name: field.name.clone(),
                    field_type: d.field_type,
                    primary_key: field.primary_key || d.primary_key,
                    display_width: d.display_width,
                },
                None => field.clone(),
            }
        })
        .collect()
}
