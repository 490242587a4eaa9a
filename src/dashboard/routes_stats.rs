//! Admin statistics endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

use super::AppState;
use crate::stats;
use crate::store::ContractFilter;

pub(super) async fn handler_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let jobs = match state.store.all_jobs().await {
        Ok(j) => j,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Failed to load jobs: {}", e)})),
            )
                .into_response()
        }
    };
    let contracts = match state.store.list_contracts(&ContractFilter::default()).await {
        Ok(c) => c,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": format!("Failed to load contracts: {}", e)})),
            )
                .into_response()
        }
    };
    Json(stats::compute_stats(&jobs, &contracts, state.clock.now())).into_response()
}
