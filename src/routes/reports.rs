use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::ReportRecord;
use crate::state::SharedState;

pub async fn get(
    State(state): State<SharedState>,
    Path((form_slug, job_id)): Path<(String, String)>,
) -> Result<Json<ReportRecord>, AppError> {
    let form = state
        .forms
        .get(&form_slug)
        .ok_or_else(|| AppError::NotFound("Unknown form".to_string()))?;

    if Uuid::parse_str(&job_id).is_err() {
        return Err(AppError::NotFound("Report not found".to_string()));
    }

    let report = state
        .store
        .find_report(form.report_table, &job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

    Ok(Json(report))
}
