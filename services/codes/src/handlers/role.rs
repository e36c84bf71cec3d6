use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::info;

use rolegate_core::internal::InternalCaller;

use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTargetRoleRequest {
    pub role_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRoleResponse {
    pub role_id: Option<String>,
}

// ── GET /internal/target-role ────────────────────────────────────────────────

pub async fn get_target_role(
    _caller: InternalCaller,
    State(state): State<AppState>,
) -> Json<TargetRoleResponse> {
    Json(TargetRoleResponse {
        role_id: state.target_role.get(),
    })
}

// ── PUT /internal/target-role ────────────────────────────────────────────────

pub async fn set_target_role(
    _caller: InternalCaller,
    State(state): State<AppState>,
    Json(body): Json<SetTargetRoleRequest>,
) -> Json<TargetRoleResponse> {
    let role_id = state.target_role.set(body.role_id.as_deref());
    match &role_id {
        Some(id) => info!(role_id = %id, "target role set"),
        None => info!("target role cleared"),
    }
    Json(TargetRoleResponse { role_id })
}
