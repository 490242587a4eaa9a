//! Contract API — workers apply for jobs, growers review applications.

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use tracing::info;

use super::AppState;
use crate::store::{ContractFilter, ContractStatus};

/// Accept worker ids sent either as strings or as JSON numbers.
fn worker_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "worker_id must be a string or number, got {}",
            other
        ))),
    }
}

#[derive(Deserialize)]
pub(super) struct CreateContractPayload {
    job_id: i64,
    #[serde(default, deserialize_with = "worker_id_string")]
    worker_id: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct UpdateContractPayload {
    status: String,
}

pub(super) async fn handler_contracts_list(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<ContractFilter>,
) -> impl IntoResponse {
    match state.store.list_contracts(&filter).await {
        Ok(contracts) => Json(contracts).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to list contracts: {}", e)})),
        )
            .into_response(),
    }
}

pub(super) async fn handler_contract_get(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<i64>,
) -> impl IntoResponse {
    match state.store.get_contract(id).await {
        Ok(Some(contract)) => Json(contract).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Contract not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

pub(super) async fn handler_contracts_create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateContractPayload>,
) -> impl IntoResponse {
    let job = match state.store.get_job(payload.job_id).await {
        Ok(Some(job)) => job,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Job not found"})),
            )
                .into_response()
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    match state.store.create_contract(&job, payload.worker_id).await {
        Ok(contract) => {
            state.prom_metrics.contracts_created.inc();
            info!(
                contract_id = contract.id,
                job_id = contract.job_id,
                worker_id = contract.worker_id.as_deref().unwrap_or("-"),
                "contract created"
            );
            (StatusCode::CREATED, Json(contract)).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to create contract: {}", e)})),
        )
            .into_response(),
    }
}

pub(super) async fn handler_contract_update(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<i64>,
    Json(payload): Json<UpdateContractPayload>,
) -> impl IntoResponse {
    match state.store.get_contract(id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "Contract not found"})),
            )
                .into_response()
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    }

    let status = match payload.status.parse::<ContractStatus>() {
        Ok(s) if s.is_reviewable() => s,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({
                    "error": "Status must be 'accepted', 'rejected', or 'pending'"
                })),
            )
                .into_response()
        }
    };

    match state.store.update_contract_status(id, status).await {
        Ok(Some(contract)) => {
            info!(contract_id = id, status = %status, "contract reviewed");
            Json(contract).into_response()
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Contract not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}
