use tokio_util::sync::CancellationToken;

use super::types::ExportSettings;
use crate::pagination::RowBudget;

/// State shared by all workers of one run.
///
/// Only the cancellation token and the row budget change while workers run.
#[derive(Debug)]
pub struct RunContext {
    /// Engine settings
    pub settings: ExportSettings,
    interrupt: CancellationToken,
    cancel: CancellationToken,
    budget: RowBudget,
}

impl RunContext {
    /// Creates the context. Cancelling `interrupt` stops every worker and
    /// marks the run as interrupted.
    pub fn new(settings: ExportSettings, interrupt: CancellationToken) -> Self {
        let budget = RowBudget::new(settings.global_limit);
        Self {
            settings,
            cancel: interrupt.child_token(),
            interrupt,
            budget,
        }
    }

    /// Whether workers should stop before their next batch or row.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Stops all workers after a failure.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the run was cancelled from outside.
    pub fn is_interrupted(&self) -> bool {
        self.interrupt.is_cancelled()
    }

    /// Rows left under the global limit.
    pub fn budget(&self) -> &RowBudget {
        &self.budget
    }
}
