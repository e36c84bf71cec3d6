use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, warn};

use crate::domain::ports::RoleGateway;
use crate::domain::types::RoleGrant;

/// Owns the timers that take granted roles back.
///
/// On shutdown every pending grant is revoked immediately: nothing survives a
/// restart to revoke it later.
#[derive(Clone)]
pub struct RevocationScheduler {
    tracker: TaskTracker,
    cancel: CancellationToken,
}

impl RevocationScheduler {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            tracker: TaskTracker::new(),
            cancel,
        }
    }

    /// Revocations not yet carried out.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_shutting_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn schedule<G: RoleGateway>(&self, gateway: G, grant: RoleGrant, after: Duration) {
        let cancel = self.cancel.clone();
        self.tracker.spawn(async move {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    warn!(role_id = %grant.role_id, claimant = %grant.claimant, "revoking early on shutdown");
                }
                () = tokio::time::sleep(after) => {}
            }
            match gateway.revoke(&grant).await {
                Ok(()) => info!(role_id = %grant.role_id, claimant = %grant.claimant, "role revoked"),
                Err(e) => error!(
                    error = %e,
                    role_id = %grant.role_id,
                    claimant = %grant.claimant,
                    "failed to revoke role"
                ),
            }
        });
    }

    /// Trigger every pending revocation now and wait for them to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}
