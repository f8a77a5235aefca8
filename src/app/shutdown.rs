//! Interrupt handling.

use log::warn;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Cancels `cancel` on Ctrl-C.
///
/// Workers finish the query in flight, close their files and stop before the
/// next batch. The returned task ends after the first signal, or when `cancel`
/// is cancelled some other way.
pub fn watch_for_interrupt(cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    warn!("Interrupted, stopping after the current batches");
                    cancel.cancel();
                }
            }
            _ = cancel.cancelled() => {}
        }
    })
}
