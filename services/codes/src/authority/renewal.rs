use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::authority::CodeAuthority;

/// The one scheduled renewal for the authority. Sleeps until the current
/// cycle's expiry and rolls it over; re-arms whenever any path publishes a
/// new cycle. Stops when its token is cancelled.
pub struct RenewalTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl RenewalTask {
    pub fn spawn(authority: Arc<CodeAuthority>, cancel: CancellationToken) -> Self {
        let handle = tokio::spawn(run(authority, cancel.clone()));
        Self { cancel, handle }
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Cancel and wait for the task to exit.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "renewal task panicked");
        }
    }
}

async fn run(authority: Arc<CodeAuthority>, cancel: CancellationToken) {
    let mut cycles = authority.subscribe();
    loop {
        let cycle = cycles.borrow_and_update().clone();
        let wait = (cycle.expires_at - authority.now())
            .to_std()
            .unwrap_or_default();
        debug!(epoch = cycle.epoch, wait_ms = wait.as_millis() as u64, "renewal armed");

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = cycles.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            () = tokio::time::sleep(wait) => {
                authority.rollover_if_due(cycle.epoch);
            }
        }
    }
    info!("renewal task stopped");
}
