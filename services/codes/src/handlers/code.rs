use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use rolegate_core::internal::InternalCaller;
use rolegate_core::serde::seconds_until;

use crate::domain::types::Cycle;
use crate::error::CodesServiceError;
use crate::state::AppState;

// ── Response types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeResponse {
    pub code: String,
    pub expires_in: i64,
    #[serde(serialize_with = "rolegate_core::serde::to_unix_millis")]
    pub expires_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleResponse {
    pub cycle_id: Uuid,
    pub expires_in: i64,
    #[serde(serialize_with = "rolegate_core::serde::to_unix_millis")]
    pub expires_at: DateTime<Utc>,
}

impl CycleResponse {
    fn new(cycle: Cycle, now: DateTime<Utc>) -> Self {
        Self {
            cycle_id: cycle.id,
            expires_in: seconds_until(cycle.expires_at, now),
            expires_at: cycle.expires_at,
        }
    }
}

// ── GET /api/code ────────────────────────────────────────────────────────────

pub async fn issue_code(
    State(state): State<AppState>,
) -> Result<Json<CodeResponse>, CodesServiceError> {
    let issued = state.issue_usecase().execute()?;
    Ok(Json(CodeResponse {
        code: issued.code,
        expires_in: issued.expires_in_secs,
        expires_at: issued.expires_at,
    }))
}

// ── GET /api/cycle ───────────────────────────────────────────────────────────

pub async fn get_cycle(State(state): State<AppState>) -> Json<CycleResponse> {
    let cycle = state.authority.current_cycle();
    Json(CycleResponse::new(cycle, state.authority.now()))
}

// ── POST /internal/cycle/refresh ─────────────────────────────────────────────

pub async fn refresh_cycle(
    _caller: InternalCaller,
    State(state): State<AppState>,
) -> Json<CycleResponse> {
    let cycle = state.authority.refresh_cycle();
    Json(CycleResponse::new(cycle, state.authority.now()))
}
