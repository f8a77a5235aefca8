//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `db_json_export` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - Ctrl-C handling and user-facing output
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;
use tokio_util::sync::CancellationToken;

use db_json_export::app::{print_statistics, watch_for_interrupt};
use db_json_export::config::Opt;
use db_json_export::error_handling::exit_code_for;
use db_json_export::initialization::{init_logger_to_file, init_logger_with};
use db_json_export::{run_export, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // DATABASE_URL may come from a .env file next to the working directory or the executable
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let config = Config::from(Opt::parse());

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    let logger = match &config.log_file {
        Some(path) => init_logger_to_file(log_level.into(), log_format, path),
        None => init_logger_with(log_level.into(), log_format),
    };
    logger.context("Failed to initialize logger")?;

    let cancel = CancellationToken::new();
    let interrupt_watcher = watch_for_interrupt(cancel.clone());
    let stats = config.stats;

    let outcome = run_export(config, cancel.clone()).await;
    interrupt_watcher.abort();

    match outcome {
        Ok(report) => {
            for description in &report.descriptions {
                println!("{}", description);
            }
            print_statistics(&report, stats);
            let code = report.exit_code();
            if code != 0 {
                process::exit(code);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("db_json_export error: {:#}", e);
            process::exit(exit_code_for(&e));
        }
    }
}
