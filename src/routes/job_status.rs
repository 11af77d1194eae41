use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use uuid::Uuid;

use crate::models::JobStatus;
use crate::state::SharedState;

/// Current status of a job as the store sees it right now. Never cached.
pub async fn job_status(
    State(state): State<SharedState>,
    Path(job_id): Path<String>,
) -> Response {
    tracing::debug!("[job-status] Checking status for job {job_id}");

    // Ids are UUIDs; anything else cannot exist in the store.
    if Uuid::parse_str(&job_id).is_err() {
        return reply(StatusCode::NOT_FOUND, json!({ "status": JobStatus::NotFound }));
    }

    match state.store.job_status(&job_id).await {
        Ok(Some(row)) => {
            let status = row
                .status
                .filter(|s| !s.trim().is_empty())
                .map(|s| JobStatus::parse(&s))
                .unwrap_or(JobStatus::Processing);
            tracing::debug!("[job-status] Job {job_id} is {status}");
            reply(StatusCode::OK, json!({ "status": status }))
        }
        Ok(None) => {
            tracing::info!("[job-status] Job {job_id} not found");
            reply(StatusCode::NOT_FOUND, json!({ "status": JobStatus::NotFound }))
        }
        Err(e) => {
            tracing::error!("[job-status] Store error for job {job_id}: {e}");
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "status": JobStatus::Error, "error": "Failed to fetch job status" }),
            )
        }
    }
}

fn reply(status: StatusCode, body: serde_json::Value) -> Response {
    (status, [(header::CACHE_CONTROL, "no-store")], Json(body)).into_response()
}
