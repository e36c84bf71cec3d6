use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Handler for `GET /readyz`. Not ready once shutdown has begun.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    if state.revocations.is_shutting_down() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}
