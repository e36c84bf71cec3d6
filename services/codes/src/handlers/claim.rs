use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use rolegate_core::internal::InternalCaller;

use crate::domain::types::{RejectReason, Verification};
use crate::error::CodesServiceError;
use crate::state::AppState;
use crate::usecase::claim::{ClaimInput, ClaimOutcome};

#[derive(Deserialize)]
pub struct ClaimRequest {
    pub code: String,
    pub claimant: String,
}

#[derive(Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
}

impl From<Verification> for VerifyResponse {
    fn from(v: Verification) -> Self {
        Self {
            valid: v.is_valid(),
            reason: v.reason(),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ClaimResponse {
    Granted {
        #[serde(rename = "roleId")]
        role_id: String,
        #[serde(rename = "revokeAt", serialize_with = "rolegate_core::serde::to_unix_millis")]
        revoke_at: DateTime<Utc>,
    },
    Rejected {
        reason: RejectReason,
    },
    NoRoleConfigured,
    GrantFailed,
}

impl From<ClaimOutcome> for ClaimResponse {
    fn from(outcome: ClaimOutcome) -> Self {
        match outcome {
            ClaimOutcome::Granted { role_id, revoke_at } => Self::Granted { role_id, revoke_at },
            ClaimOutcome::Rejected(reason) => Self::Rejected { reason },
            ClaimOutcome::NoRoleConfigured => Self::NoRoleConfigured,
            ClaimOutcome::GrantFailed => Self::GrantFailed,
        }
    }
}

// ── POST /api/verify ─────────────────────────────────────────────────────────

pub async fn verify_code(
    _caller: InternalCaller,
    State(state): State<AppState>,
    Json(body): Json<ClaimRequest>,
) -> Result<Json<VerifyResponse>, CodesServiceError> {
    let input = ClaimInput::parse(state.authority.format(), &body.code, &body.claimant)?;
    let verification = state.authority.verify_code(&input.code, &input.claimant);
    Ok(Json(verification.into()))
}

// ── POST /api/claims ─────────────────────────────────────────────────────────

pub async fn claim_role(
    _caller: InternalCaller,
    State(state): State<AppState>,
    Json(body): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>, CodesServiceError> {
    let input = ClaimInput::parse(state.authority.format(), &body.code, &body.claimant)?;
    let outcome = state.claim_usecase().execute(input).await;
    Ok(Json(outcome.into()))
}
