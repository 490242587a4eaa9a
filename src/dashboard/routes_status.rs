//! Index banner and board health summary.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::AppState;

pub(super) async fn handler_index() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Baja California Harvest Labor API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "jobs": "/jobs",
            "contracts": "/contracts",
            "stats": "/stats",
            "health": "/health",
            "metrics": "/metrics",
        }
    }))
}

#[derive(Serialize)]
pub(super) struct HealthResponse {
    pub status: &'static str,
    pub jobs_count: i64,
    pub contracts_count: i64,
}

pub(super) async fn handler_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let counts = async {
        let jobs = state.store.count_jobs().await?;
        let contracts = state.store.count_contracts().await?;
        anyhow::Ok((jobs, contracts))
    };
    match counts.await {
        Ok((jobs_count, contracts_count)) => Json(HealthResponse {
            status: "healthy",
            jobs_count,
            contracts_count,
        })
        .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}
