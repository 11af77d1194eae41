use std::net::SocketAddr;

use axum::body::Bytes;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use crate::state::SharedState;
use crate::submission::pipeline::{self, PipelineError};
use crate::submission::{metadata, parser};

fn failure(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn invalid_payload() -> Response {
    failure(
        StatusCode::BAD_REQUEST,
        json!({ "success": false, "error": "Invalid payload: expected JSON object." }),
    )
}

pub async fn submit(
    State(state): State<SharedState>,
    Path(form_slug): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(form) = state.forms.get(&form_slug) else {
        return failure(
            StatusCode::NOT_FOUND,
            json!({ "success": false, "error": "Unknown form" }),
        );
    };

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let parsed = if content_type.is_some_and(|ct| ct.contains("multipart/form-data")) {
        parser::parse_multipart(&headers, body).await
    } else {
        parser::parse_body(content_type, &body)
    };

    let payload = match parsed {
        Ok(Value::Object(map)) => map,
        Ok(_) => return invalid_payload(),
        Err(e) => {
            tracing::warn!("[proxy] Unreadable {} submission: {e}", form.slug);
            return invalid_payload();
        }
    };

    let client = metadata::extract(&headers, Some(addr.ip()), &state.config.trusted_proxies);

    match pipeline::run(&state, form, &client, &payload).await {
        Ok(result) => {
            let mut body = json!({
                "success": true,
                "message": result.message,
                "details": result.details,
            });
            if let Some(job_id) = result.job_id {
                body["job_id"] = json!(job_id);
            }
            if let Some(url) = result.redirect_url {
                body["redirect_url"] = json!(url);
            }
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(PipelineError::RateLimited { retry_after }) => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, retry_after.to_string())],
            Json(json!({
                "success": false,
                "error": format!("Too many submissions. Retry after {retry_after}s."),
            })),
        )
            .into_response(),
        Err(PipelineError::MissingFields(missing)) => failure(
            StatusCode::BAD_REQUEST,
            json!({
                "success": false,
                "error": "Missing required fields for webhook submission.",
                "missingFields": missing,
            }),
        ),
        Err(PipelineError::Transport(reason)) => {
            tracing::error!("[proxy] Webhook delivery for {} failed: {reason}", form.slug);
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "success": false,
                    "error": "Server failed to submit the webhook request.",
                }),
            )
        }
        Err(PipelineError::Upstream {
            status,
            error,
            details,
            missing_fields,
        }) => {
            let mut body = json!({
                "success": false,
                "error": error,
                "details": details,
            });
            if let Some(missing) = missing_fields {
                body["missingFields"] = json!(missing);
            }
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            failure(status, body)
        }
    }
}
