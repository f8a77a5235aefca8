//! Runs prepared jobs, one task per table or one after another.

use std::sync::Arc;

use log::{error, info, warn};

use super::context::RunContext;
use super::job::ExportJob;
use super::output::open_destination;
use super::statements::run_init_statements;
use super::types::TableReport;
use super::worker::{dry_run_job, export_job};
use crate::database::{SessionFactory, SqlSession};
use crate::error_handling::ExportError;

/// Drives the jobs of one run and collects their reports.
pub struct ExportCoordinator {
    factory: Arc<dyn SessionFactory>,
    ctx: Arc<RunContext>,
}

impl ExportCoordinator {
    /// Creates a coordinator opening worker sessions from `factory`.
    pub fn new(factory: Arc<dyn SessionFactory>, ctx: Arc<RunContext>) -> Self {
        Self { factory, ctx }
    }

    /// The run context shared with workers.
    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Exports every job and returns their reports in job order.
    ///
    /// In parallel mode each job runs in its own task on its own connection;
    /// otherwise jobs run one after another on `main`. A failure cancels the
    /// remaining work when `stop_on_error` is set.
    pub async fn run(&self, main: &mut dyn SqlSession, jobs: Vec<ExportJob>) -> Vec<TableReport> {
        if self.ctx.settings.parallel && jobs.len() > 1 {
            self.run_parallel(jobs).await
        } else {
            self.run_sequential(main, jobs).await
        }
    }

    async fn run_sequential(
        &self,
        main: &mut dyn SqlSession,
        jobs: Vec<ExportJob>,
    ) -> Vec<TableReport> {
        let mut reports = Vec::with_capacity(jobs.len());
        for job in jobs {
            if self.ctx.is_cancelled() {
                info!("Skipping {}: run cancelled", job.name);
                break;
            }
            reports.push(export_on(main, job, &self.ctx).await);
        }
        reports
    }

    async fn run_parallel(&self, jobs: Vec<ExportJob>) -> Vec<TableReport> {
        info!("Exporting {} tables in parallel", jobs.len());
        let handles: Vec<_> = jobs
            .into_iter()
            .map(|job| {
                let factory = Arc::clone(&self.factory);
                let ctx = Arc::clone(&self.ctx);
                let name = job.name.clone();
                let handle = tokio::spawn(async move { run_worker(factory, job, ctx).await });
                (name, handle)
            })
            .collect();

        let mut reports = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    let err = ExportError::TaskFailed {
                        table: name.clone(),
                        message: e.to_string(),
                    };
                    error!("{}", err);
                    if self.ctx.settings.stop_on_error {
                        self.ctx.cancel();
                    }
                    reports.push(TableReport {
                        name,
                        error_code: err.exit_code(),
                        error: Some(err.to_string()),
                        ..Default::default()
                    });
                }
            }
        }
        reports
    }

    /// Describes every job from a one-row query instead of exporting.
    pub async fn dry_run(
        &self,
        main: &mut dyn SqlSession,
        jobs: Vec<ExportJob>,
    ) -> (Vec<TableReport>, Vec<String>) {
        let mut reports = Vec::with_capacity(jobs.len());
        let mut descriptions = Vec::with_capacity(jobs.len());
        for mut job in jobs {
            let outcome = dry_run_job(main, &mut job, &self.ctx).await;
            match outcome {
                Ok(text) => {
                    descriptions.push(text);
                    reports.push(report_for(&job, &Ok(()), &self.ctx));
                }
                Err(e) => {
                    let outcome = Err(e);
                    reports.push(report_for(&job, &outcome, &self.ctx));
                    if self.ctx.settings.stop_on_error {
                        break;
                    }
                }
            }
        }
        (reports, descriptions)
    }
}

/// Worker task body: own connection, thread init statements, then export.
async fn run_worker(
    factory: Arc<dyn SessionFactory>,
    job: ExportJob,
    ctx: Arc<RunContext>,
) -> TableReport {
    let mut session = match factory.connect().await {
        Ok(session) => session,
        Err(e) => return fail(&job, e.into(), &ctx),
    };
    if let Err(e) = run_init_statements(
        session.as_mut(),
        &ctx.settings.thread_init,
        ctx.settings.stop_on_init_error,
    )
    .await
    {
        return fail(&job, e, &ctx);
    }
    export_on(session.as_mut(), job, &ctx).await
}

async fn export_on(session: &mut dyn SqlSession, mut job: ExportJob, ctx: &RunContext) -> TableReport {
    let out = match open_destination(&job.destination).await {
        Ok(out) => out,
        Err(e) => return fail(&job, e, ctx),
    };
    let outcome = export_job(session, &mut job, out, ctx).await;
    if let Err(e) = &outcome {
        error!("Export of {} failed: {}", job.name, e);
        if ctx.settings.stop_on_error {
            warn!("Stopping remaining exports");
            ctx.cancel();
        }
    }
    report_for(&job, &outcome, ctx)
}

fn fail(job: &ExportJob, err: ExportError, ctx: &RunContext) -> TableReport {
    error!("Export of {} failed: {}", job.name, err);
    if ctx.settings.stop_on_error {
        ctx.cancel();
    }
    report_for(job, &Err(err), ctx)
}

fn report_for(job: &ExportJob, outcome: &Result<(), ExportError>, ctx: &RunContext) -> TableReport {
    let (error_code, error) = match outcome {
        Ok(()) => (0, None),
        Err(e) => (e.exit_code(), Some(e.to_string())),
    };
    TableReport {
        name: job.name.clone(),
        output: job.destination.path().map(|p| p.to_path_buf()),
        rows: job.rows_emitted,
        batches: job.batches_emitted,
        elapsed_seconds: job.elapsed_seconds(),
        error_code,
        error,
        cancelled: outcome.is_ok() && ctx.is_cancelled(),
    }
}
