use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::authority::CodeAuthority;
use crate::authority::format::CodeFormat;
use crate::domain::ports::RoleGateway;
use crate::domain::types::{Claimant, RejectReason, RoleGrant, Verification};
use crate::error::CodesServiceError;
use crate::infra::revocation::RevocationScheduler;

/// A code submission as typed by a person, normalized for lookup.
#[derive(Debug, Clone)]
pub struct ClaimInput {
    pub code: String,
    pub claimant: Claimant,
}

impl ClaimInput {
    /// Normalizes the code for the active format; rejects lengths that can
    /// never match and blank claimants.
    pub fn parse(
        format: &CodeFormat,
        code: &str,
        claimant: &str,
    ) -> Result<Self, CodesServiceError> {
        let code = format.normalize(code);
        if code.chars().count() != format.formatted_len() {
            return Err(CodesServiceError::InvalidInput(format!(
                "code must be {} characters",
                format.formatted_len()
            )));
        }
        let claimant = claimant.trim();
        if claimant.is_empty() {
            return Err(CodesServiceError::InvalidInput(
                "claimant must not be empty".to_owned(),
            ));
        }
        Ok(Self {
            code,
            claimant: Claimant::new(claimant),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    Granted {
        role_id: String,
        revoke_at: DateTime<Utc>,
    },
    Rejected(RejectReason),
    /// The code was consumed but staff have not configured a role yet.
    NoRoleConfigured,
    /// The code was consumed but the platform refused the grant.
    GrantFailed,
}

/// Redeem a code for the configured role and schedule its revocation one
/// cycle duration later.
pub struct ClaimRoleUseCase<G>
where
    G: RoleGateway,
{
    pub authority: Arc<CodeAuthority>,
    pub gateway: G,
    pub revocations: RevocationScheduler,
    pub target_role: Option<String>,
}

impl<G> ClaimRoleUseCase<G>
where
    G: RoleGateway,
{
    pub async fn execute(&self, input: ClaimInput) -> ClaimOutcome {
        // 1. Verify + consume
        if let Verification::Rejected(reason) =
            self.authority.verify_code(&input.code, &input.claimant)
        {
            info!(claimant = %input.claimant, reason = reason.as_str(), "claim rejected");
            return ClaimOutcome::Rejected(reason);
        }

        // 2. Resolve role
        let Some(role_id) = self.target_role.clone() else {
            warn!(claimant = %input.claimant, "code redeemed but no target role configured");
            return ClaimOutcome::NoRoleConfigured;
        };

        // 3. Grant for one cycle duration
        let hold = self.authority.cycle_duration();
        let granted_at = self.authority.now();
        let grant = RoleGrant {
            role_id,
            claimant: input.claimant,
            granted_at,
            revoke_at: granted_at + hold,
        };
        if let Err(e) = self.gateway.grant(&grant).await {
            error!(
                error = %e,
                role_id = %grant.role_id,
                claimant = %grant.claimant,
                "role grant failed after code was consumed"
            );
            return ClaimOutcome::GrantFailed;
        }

        // 4. Schedule revocation
        self.revocations
            .schedule(self.gateway.clone(), grant.clone(), hold.to_std().unwrap_or_default());
        info!(role_id = %grant.role_id, claimant = %grant.claimant, revoke_at = %grant.revoke_at, "role granted");

        ClaimOutcome::Granted {
            role_id: grant.role_id,
            revoke_at: grant.revoke_at,
        }
    }
}
