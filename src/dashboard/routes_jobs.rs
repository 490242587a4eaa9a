//! Job board API — list, fetch, create, delete, and regenerate postings.

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::AppState;
use crate::store::{JobFilter, NewJob};

pub(super) async fn handler_jobs_list(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<JobFilter>,
) -> impl IntoResponse {
    match state.store.list_jobs(&filter).await {
        Ok(jobs) => Json(jobs).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to list jobs: {}", e)})),
        )
            .into_response(),
    }
}

pub(super) async fn handler_job_get(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<i64>,
) -> impl IntoResponse {
    match state.store.get_job(id).await {
        Ok(Some(job)) => Json(job).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Job not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

pub(super) async fn handler_jobs_create(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewJob>,
) -> impl IntoResponse {
    match state.store.create_job(payload).await {
        Ok(job) => {
            info!(job_id = job.id, title = %job.title, "job created");
            state.refresh_job_gauge().await;
            (StatusCode::CREATED, Json(job)).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to create job: {}", e)})),
        )
            .into_response(),
    }
}

pub(super) async fn handler_job_delete(
    State(state): State<Arc<AppState>>,
    AxumPath(id): AxumPath<i64>,
) -> impl IntoResponse {
    match state.store.delete_job(id).await {
        Ok(true) => {
            info!(job_id = id, "job deleted");
            state.refresh_job_gauge().await;
            Json(serde_json::json!({"message": "Job deleted successfully"})).into_response()
        }
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Job not found"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

#[derive(Deserialize)]
pub(super) struct RegenerateQuery {
    num_jobs: Option<i64>,
    arrival_rate_minutes: Option<f64>,
}

pub(super) async fn handler_jobs_regenerate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegenerateQuery>,
) -> impl IntoResponse {
    let params = state
        .generator
        .params(query.num_jobs, query.arrival_rate_minutes);
    if let Err(e) = params.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response();
    }

    match state.regenerate_jobs(&params).await {
        Ok(count) => {
            info!(
                count,
                arrival_rate_minutes = params.arrival_rate_minutes,
                "jobs regenerated"
            );
            Json(serde_json::json!({
                "message": format!("Regenerated {} jobs", count),
                "jobs_count": count,
            }))
            .into_response()
        }
        Err(e) if e.is_invalid_input() => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": format!("Failed to regenerate jobs: {}", e)})),
        )
            .into_response(),
    }
}
