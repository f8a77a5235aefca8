use std::io::{self, Write};
use std::time::Instant;

use futures::StreamExt;
use log::{debug, info};
use tokio::sync::mpsc;

use super::context::RunContext;
use super::describe::describe_job;
use super::job::{merge_declared, ExportJob};
use crate::database::SqlSession;
use crate::error_handling::ExportError;
use crate::pagination::{effective_limit, BatchLimit};
use crate::schema::resolve_result_columns;
use crate::serialize::{serialize_row, JsonWriter, OutputFormat};

/// Serialized rows waiting for the writer thread.
const WRITE_QUEUE: usize = 1024;

/// Exports a prepared job to `out`, batch by batch.
///
/// Rows are serialized here and written by a blocking task that owns `out`,
/// so slow files never hold up the runtime. The output framing is closed
/// even when the export fails or is cancelled, so whatever was written stays
/// well-formed JSON.
///
/// # Errors
///
/// Database errors from a batch query, I/O errors while writing,
/// [`ExportError::NullBatchValue`] when the cursor cannot advance and
/// [`ExportError::IncrementOverflow`] when a fixed column runs out of range.
pub async fn export_job(
    session: &mut dyn SqlSession,
    job: &mut ExportJob,
    out: Box<dyn Write + Send>,
    ctx: &RunContext,
) -> Result<(), ExportError> {
    job.started = Some(Instant::now());
    info!("Exporting {} to {}", job.name, job.destination);

    let (tx, rx) = mpsc::channel(WRITE_QUEUE);
    let format = ctx.settings.format;
    let sink = tokio::task::spawn_blocking(move || write_rows(out, format, rx));

    let result = page_through(session, job, &tx, ctx).await;
    drop(tx);
    let closed = match sink.await {
        Ok(written) => written.map_err(|e| ExportError::io(&job.destination, e)),
        Err(e) => Err(ExportError::TaskFailed {
            table: job.name.clone(),
            message: e.to_string(),
        }),
    };
    job.finished = Some(Instant::now());

    info!(
        "Exported {} rows from {} in {} batch(es), {:.1}s",
        job.rows_emitted,
        job.name,
        job.batches_emitted,
        job.elapsed_seconds()
    );
    result.and(closed)
}

/// Drains `rows` into `out` until every sender is gone, then closes the
/// framing.
fn write_rows(
    out: Box<dyn Write + Send>,
    format: OutputFormat,
    mut rows: mpsc::Receiver<String>,
) -> io::Result<()> {
    let mut writer = JsonWriter::new(out, format);
    let mut written = writer.begin();
    if written.is_ok() {
        while let Some(object) = rows.blocking_recv() {
            if let Err(e) = writer.write_object(&object) {
                written = Err(e);
                break;
            }
        }
    }
    drop(rows);
    let closed = writer.finish().map(drop);
    written.and(closed)
}

async fn page_through(
    session: &mut dyn SqlSession,
    job: &mut ExportJob,
    rows_out: &mpsc::Sender<String>,
    ctx: &RunContext,
) -> Result<(), ExportError> {
    let settings = &ctx.settings;
    let mut table_remaining = (settings.table_limit > 0).then_some(settings.table_limit);
    let mut resolved = false;

    loop {
        if ctx.is_cancelled() {
            info!("Export of {} cancelled after {} rows", job.name, job.rows_emitted);
            break;
        }
        let limit = effective_limit(job.batch_size, ctx.budget().remaining(), table_remaining);
        if limit == BatchLimit::Exhausted {
            debug!("Row limit reached for {}", job.name);
            break;
        }

        let sql = job
            .materialize(limit, settings.where_suffix.as_deref())
            .to_string();
        debug!("{} batch {}: {}", job.name, job.batches_emitted + 1, sql);
        let mut result = session.query(&sql, settings.fetch_mode).await?;
        job.batches_emitted += 1;

        if !resolved {
            let fields = merge_declared(&result.fields, &job.declared);
            resolve_result_columns(&mut job.columns, &fields, &settings.resolve);
            resolved = true;
        }
        let batch_ordinal = job
            .batch_column
            .and_then(|i| job.columns.get(i))
            .and_then(|c| c.source_ordinal);

        let mut batch_rows = 0u64;
        let mut last_key: Option<Vec<u8>> = None;
        let mut stopped = false;
        while let Some(row) = result.rows.next().await {
            let row = row?;
            if !ctx.budget().try_take() {
                stopped = true;
                break;
            }
            if let Some(ordinal) = batch_ordinal {
                last_key = row.get(ordinal).cloned().flatten();
            }

            let mut object = String::with_capacity(256);
            serialize_row(&mut job.columns, &row, &settings.serialize, &mut object)?;
            if rows_out.send(object).await.is_err() {
                // the writer failed; its error is reported when it is joined
                debug!("Writer for {} closed early", job.name);
                return Ok(());
            }
            batch_rows += 1;
            job.rows_emitted += 1;
            if let Some(remaining) = table_remaining.as_mut() {
                *remaining = remaining.saturating_sub(1);
            }

            if ctx.is_cancelled() {
                stopped = true;
                break;
            }
        }
        drop(result);

        if let (Some(index), Some(_)) = (job.batch_column, batch_ordinal) {
            if job.batch_size > 0 && batch_rows > 0 {
                match last_key {
                    Some(value) => job.columns[index].previous_cursor_value = Some(value),
                    None => {
                        return Err(ExportError::NullBatchValue {
                            table: job.name.clone(),
                            column: job.columns[index].name.clone(),
                            rows: job.rows_emitted,
                        })
                    }
                }
            }
        }

        let requested = limit.rows();
        if stopped || job.batch_size == 0 || requested == 0 || batch_rows < requested {
            break;
        }
    }
    Ok(())
}

/// Runs a single one-row batch and describes the resolved columns instead of
/// exporting.
pub async fn dry_run_job(
    session: &mut dyn SqlSession,
    job: &mut ExportJob,
    ctx: &RunContext,
) -> Result<String, ExportError> {
    let settings = &ctx.settings;
    let sql = job
        .materialize(BatchLimit::Rows(1), settings.where_suffix.as_deref())
        .to_string();
    debug!("Dry run of {}: {}", job.name, sql);

    let mut result = session.query(&sql, settings.fetch_mode).await?;
    let fields = merge_declared(&result.fields, &job.declared);
    resolve_result_columns(&mut job.columns, &fields, &settings.resolve);
    while let Some(row) = result.rows.next().await {
        row?;
    }
    drop(result);
    job.batches_emitted = 1;

    Ok(describe_job(job))
}
