use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::forms::FormDefinition;
use crate::state::SharedState;

use super::fields;
use super::metadata::ClientInfo;
use super::relay::RelayResponse;

const DEFAULT_MESSAGE: &str = "Webhook accepted the payload.";
const GATEWAY_FAILURE: u16 = 502;

pub struct PipelineResult {
    pub message: String,
    pub details: Option<Value>,
    pub job_id: Option<String>,
    pub redirect_url: Option<String>,
}

#[derive(Debug)]
pub enum PipelineError {
    RateLimited { retry_after: u64 },
    MissingFields(Vec<&'static str>),
    /// The webhook could not be reached or its body could not be read.
    Transport(String),
    /// The webhook answered, but not with an acceptance.
    Upstream {
        status: u16,
        error: String,
        details: Option<String>,
        missing_fields: Option<Vec<String>>,
    },
}

pub async fn run(
    state: &SharedState,
    form: &'static FormDefinition,
    client: &ClientInfo,
    payload: &Map<String, Value>,
) -> Result<PipelineResult, PipelineError> {
    let missing = fields::missing_required(form, payload);
    if !missing.is_empty() {
        tracing::warn!("[proxy] Missing required fields for {}: {:?}", form.slug, missing);
        return Err(PipelineError::MissingFields(missing));
    }

    // Only submissions that would reach the webhook count against the window.
    if let Err(retry_after) = state.submission_limiter.check(form.slug, client.ip) {
        tracing::warn!("[proxy] Rate limited {} submission from {}", form.slug, client.ip);
        return Err(PipelineError::RateLimited { retry_after });
    }

    let job_id = form.tracks_jobs.then(|| Uuid::now_v7().to_string());
    let outbound = fields::outbound_payload(form, payload, Utc::now(), job_id.as_deref());

    tracing::info!(
        "[proxy] Forwarding {} submission (job={}, ip={}, ua={:?}, referer={:?})",
        form.slug,
        job_id.as_deref().unwrap_or("-"),
        client.ip,
        client.user_agent,
        client.referer,
    );
    tracing::debug!("[proxy] Outgoing webhook payload: {:?}", outbound.keys());

    let response = state
        .relay
        .deliver(form, &outbound)
        .await
        .map_err(|e| PipelineError::Transport(e.message))?;

    if !response.accepted() {
        tracing::warn!(
            "[proxy] Webhook rejected {} submission with status {}",
            form.slug,
            response.status
        );
        return Err(upstream_failure(&response));
    }

    let message = response
        .str_field("message")
        .unwrap_or(DEFAULT_MESSAGE)
        .to_string();

    if let (Some(minted), Some(upstream)) = (job_id.as_deref(), response.str_field("job_id")) {
        if minted != upstream {
            tracing::warn!(
                "[proxy] Webhook for {} reported job {upstream}, keeping minted job {minted}",
                form.slug
            );
        }
    }

    let redirect_url = response
        .str_field("redirect_url")
        .map(|s| s.to_string())
        .or_else(|| job_id.as_deref().map(|id| form.report_path(id)));

    Ok(PipelineResult {
        message,
        details: response.json,
        job_id,
        redirect_url,
    })
}

fn upstream_failure(response: &RelayResponse) -> PipelineError {
    let error = response
        .str_field("error")
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("Webhook responded with status {}.", response.status));

    let details = response.str_field("details").map(|s| s.to_string()).or_else(|| {
        (response.json.is_none() && !response.text.is_empty()).then(|| response.text.clone())
    });

    let missing_fields = response
        .json
        .as_ref()
        .and_then(|v| v.get("missing_fields"))
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                .collect()
        });

    // A 2xx carrying `success: false` is still a failure for the caller.
    let status = if response.status >= 400 {
        response.status
    } else {
        GATEWAY_FAILURE
    };

    PipelineError::Upstream {
        status,
        error,
        details,
        missing_fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn non_json_failure_body_becomes_details() {
        let response = RelayResponse {
            status: 500,
            text: "<html>boom</html>".to_string(),
            json: None,
        };
        let PipelineError::Upstream {
            status,
            error,
            details,
            missing_fields,
        } = upstream_failure(&response)
        else {
            panic!("expected upstream failure");
        };
        assert_eq!(status, 500);
        assert_eq!(error, "Webhook responded with status 500.");
        assert_eq!(details.as_deref(), Some("<html>boom</html>"));
        assert!(missing_fields.is_none());
    }

    #[test]
    fn flagged_failure_on_2xx_maps_to_gateway_failure() {
        let body = json!({
            "success": false,
            "error": "Workflow rejected input",
            "missing_fields": ["company_name"],
        });
        let response = RelayResponse {
            status: 200,
            text: body.to_string(),
            json: Some(body),
        };
        let PipelineError::Upstream {
            status,
            error,
            details,
            missing_fields,
        } = upstream_failure(&response)
        else {
            panic!("expected upstream failure");
        };
        assert_eq!(status, 502);
        assert_eq!(error, "Workflow rejected input");
        assert!(details.is_none());
        assert_eq!(missing_fields, Some(vec!["company_name".to_string()]));
    }
}
