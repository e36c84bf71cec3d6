use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::types::RoleGrant;

/// Source of "now" for the authority. Swapped for a manual clock in tests.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

/// Port to the chat platform that actually applies roles.
///
/// Failures are opaque to the core: the claim flow logs them and reports a
/// failed grant, revocation failures are only logged.
pub trait RoleGateway: Clone + Send + Sync + 'static {
    fn grant(&self, grant: &RoleGrant) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn revoke(&self, grant: &RoleGrant) -> impl Future<Output = anyhow::Result<()>> + Send;
}
