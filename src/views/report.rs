use askama::Template;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use uuid::Uuid;

use crate::error::AppError;
use crate::forms::FormDefinition;
use crate::models::JobRecord;
use crate::render::{self, ReportBody};
use crate::state::SharedState;

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    title: &'a str,
    subtitle: Option<String>,
    updated_at: Option<String>,
    notice: Option<&'static str>,
    rendering: &'static str,
    content: Option<String>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
struct NotFoundTemplate {
    message: &'static str,
}

pub async fn show(
    State(state): State<SharedState>,
    Path((form_slug, job_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let Some(form) = state.forms.get(&form_slug) else {
        return not_found("We couldn't find that page.");
    };

    if Uuid::parse_str(&job_id).is_err() {
        return not_found("We couldn't find a report with that ID.");
    }

    let job = state.store.find_job(&job_id).await?;
    let report = state.store.find_report(form.report_table, &job_id).await?;

    if job.is_none() && report.is_none() {
        tracing::info!("[report] No job or report for {} {job_id}", form.slug);
        return not_found("We couldn't find a report with that ID.");
    }

    let markdown = job.as_ref().and_then(|j| markdown_source(form, j));
    let body = render::resolve(report.as_ref().and_then(|r| r.html()), markdown.as_deref());
    let completed = job.as_ref().is_some_and(JobRecord::is_completed);

    match &body {
        ReportBody::Authoritative(_) => {
            tracing::info!("[report] Rendering stored HTML for {} {job_id}", form.slug);
        }
        ReportBody::Fallback(_) => {
            tracing::warn!(
                "[report] No stored HTML for {} {job_id}, rendering Markdown fallback",
                form.slug
            );
        }
        ReportBody::Pending => {
            tracing::info!(
                "[report] {} {job_id} has no content yet (completed={completed})",
                form.slug
            );
        }
    }

    let notice = match &body {
        ReportBody::Authoritative(_) => None,
        ReportBody::Fallback(_) => Some(
            "Report is ready, but HTML version is still being generated. Displaying fallback from Markdown.",
        ),
        ReportBody::Pending if completed => {
            Some("HTML report is not yet available. Try refreshing the page later.")
        }
        ReportBody::Pending => {
            Some("Report is still being generated. Please check back in a few minutes.")
        }
    };

    let template = ReportTemplate {
        title: form.title,
        subtitle: job.as_ref().and_then(|j| subtitle(form, j)),
        updated_at: report
            .as_ref()
            .and_then(|r| r.updated_at())
            .map(|dt| dt.format("%b %-d, %Y, %-I:%M %p UTC").to_string()),
        notice,
        rendering: body.kind(),
        content: body.html().map(|s| s.to_string()),
    };

    let html = template
        .render()
        .map_err(|e| AppError::Internal(format!("Failed to render report page: {e}")))?;
    Ok(Html(html).into_response())
}

fn markdown_source(form: &FormDefinition, job: &JobRecord) -> Option<String> {
    let key = form.markdown_field?;
    job.output()?
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn subtitle(form: &FormDefinition, job: &JobRecord) -> Option<String> {
    let labels: Vec<String> = form
        .label_fields
        .iter()
        .filter_map(|key| job.lookup_str(key))
        .collect();
    (!labels.is_empty()).then(|| labels.join(" · "))
}

fn not_found(message: &'static str) -> Result<Response, AppError> {
    let html = NotFoundTemplate { message }
        .render()
        .map_err(|e| AppError::Internal(format!("Failed to render not-found page: {e}")))?;
    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}
