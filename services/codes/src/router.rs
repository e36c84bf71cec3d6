use axum::{
    Router,
    routing::{get, post},
};

use rolegate_core::error::not_found;
use rolegate_core::health::healthz;
use rolegate_core::middleware::{propagate_request_id_layer, request_id_layer, trace_layer};

use crate::handlers::{
    claim::{claim_role, verify_code},
    code::{get_cycle, issue_code, refresh_cycle},
    health::readyz,
    role::{get_target_role, set_target_role},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Issuance (public page)
        .route("/api/code", get(issue_code))
        .route("/api/cycle", get(get_cycle))
        // Consumption (bot)
        .route("/api/verify", post(verify_code))
        .route("/api/claims", post(claim_role))
        // Operator
        .route("/internal/cycle/refresh", post(refresh_cycle))
        .route("/internal/target-role", get(get_target_role).put(set_target_role))
        .fallback(not_found)
        .layer(propagate_request_id_layer())
        .layer(trace_layer())
        .layer(request_id_layer())
        .with_state(state)
}
