use std::sync::{Arc, PoisonError, RwLock};

use rolegate_core::internal::InternalTokenSource;

use crate::authority::CodeAuthority;
use crate::infra::revocation::RevocationScheduler;
use crate::infra::role_gateway::ConfiguredRoleGateway;
use crate::usecase::claim::ClaimRoleUseCase;
use crate::usecase::issue::IssueCodeUseCase;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub authority: Arc<CodeAuthority>,
    pub role_gateway: ConfiguredRoleGateway,
    pub revocations: RevocationScheduler,
    pub internal_token: Arc<str>,
    pub target_role: TargetRole,
}

impl AppState {
    pub fn issue_usecase(&self) -> IssueCodeUseCase {
        IssueCodeUseCase {
            authority: Arc::clone(&self.authority),
        }
    }

    pub fn claim_usecase(&self) -> ClaimRoleUseCase<ConfiguredRoleGateway> {
        ClaimRoleUseCase {
            authority: Arc::clone(&self.authority),
            gateway: self.role_gateway.clone(),
            revocations: self.revocations.clone(),
            target_role: self.target_role.get(),
        }
    }
}

impl InternalTokenSource for AppState {
    fn internal_token(&self) -> &str {
        &self.internal_token
    }
}

/// Role handed out by claims. Seeded from config; staff may change it at
/// runtime.
#[derive(Debug, Clone, Default)]
pub struct TargetRole(Arc<RwLock<Option<String>>>);

impl TargetRole {
    pub fn new(role_id: Option<String>) -> Self {
        Self(Arc::new(RwLock::new(role_id)))
    }

    pub fn get(&self) -> Option<String> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Blank ids clear the role.
    pub fn set(&self, role_id: Option<&str>) -> Option<String> {
        let role_id = role_id.map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned);
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = role_id.clone();
        role_id
    }
}
