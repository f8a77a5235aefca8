//! Table export engine.
//!
//! Each table (or the single user statement) becomes an [`ExportJob`]. Jobs are
//! prepared on the main connection, then handed to the [`ExportCoordinator`],
//! which pages through every job and writes its JSON file.

mod context;
mod coordinator;
mod describe;
mod job;
mod output;
mod statements;
mod types;
mod worker;

pub use context::RunContext;
pub use coordinator::ExportCoordinator;
pub use describe::describe_job;
pub use job::{merge_declared, ExportJob, JobSource};
pub use output::{open_destination, prepare_directory, Destination, IgnoreBrokenPipe};
pub use statements::{run_finish_statements, run_init_statements};
pub use types::{ExportReport, ExportSettings, TableReport};
pub use worker::{dry_run_job, export_job};
