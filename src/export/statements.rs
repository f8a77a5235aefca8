use log::{debug, error, warn};

use crate::database::SqlSession;
use crate::error_handling::ExportError;

/// Runs `--sql-init` / `--sql-thread-init` statements in order.
///
/// A failing statement stops the sequence and is returned when
/// `stop_on_error`; otherwise it is logged and the rest still run.
pub async fn run_init_statements(
    session: &mut dyn SqlSession,
    statements: &[String],
    stop_on_error: bool,
) -> Result<(), ExportError> {
    for sql in statements {
        debug!("Running init statement: {}", sql);
        if let Err(e) = session.execute(sql).await {
            if stop_on_error {
                error!("Init statement failed: {}", e);
                return Err(e.into());
            }
            warn!("Ignoring failed init statement: {}", e);
        }
    }
    Ok(())
}

/// Runs `--sql-finish` statements. Failures are logged only.
pub async fn run_finish_statements(session: &mut dyn SqlSession, statements: &[String]) {
    for sql in statements {
        debug!("Running finish statement: {}", sql);
        if let Err(e) = session.execute(sql).await {
            error!("Finish statement failed: {}", e);
        }
    }
}
