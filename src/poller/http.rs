use async_trait::async_trait;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use serde_json::Value;

use crate::models::JobStatus;

use super::{PollError, StatusSource};

/// Gateway timeout some edge proxies answer with while the workflow keeps running.
pub const BACKGROUND_TIMEOUT_STATUS: u16 = 524;

fn build_client() -> Result<reqwest::Client, PollError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .map_err(|e| PollError::Transport(format!("Failed to build HTTP client: {e}")))
}

/// Reads job status from a running formrelay server.
pub struct HttpStatusSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStatusSource {
    pub fn new(base_url: &str) -> Result<Self, PollError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch_status(&self, job_id: &str) -> Result<JobStatus, PollError> {
        let url = format!("{}/api/job-status/{job_id}", self.base_url);

        // 404 and 500 bodies carry a status too, so the HTTP code is not inspected.
        let body: Value = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| PollError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| PollError::InvalidResponse(e.to_string()))?;

        body.get("status")
            .and_then(|v| v.as_str())
            .map(JobStatus::parse)
            .ok_or_else(|| PollError::InvalidResponse(format!("missing status in {body}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted {
        message: String,
        job_id: Option<String>,
        redirect_url: Option<String>,
    },
    /// The edge timed out; the workflow most likely received the submission.
    AcceptedInBackground,
    Rejected {
        status: u16,
        message: String,
    },
}

/// Posts form payloads to a formrelay server.
pub struct SubmitClient {
    client: reqwest::Client,
    base_url: String,
}

impl SubmitClient {
    pub fn new(base_url: &str) -> Result<Self, PollError> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn submit(&self, form: &str, payload: &Value) -> Result<SubmitOutcome, PollError> {
        let url = format!("{}/api/{form}", self.base_url);

        let resp = self
            .client
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| PollError::Transport(e.to_string()))?;

        let status = resp.status().as_u16();
        if status == BACKGROUND_TIMEOUT_STATUS {
            tracing::info!("[submit] Timeout ({status}) received, job likely processing in background");
            return Ok(SubmitOutcome::AcceptedInBackground);
        }

        let body: Option<Value> = resp.json().await.ok();
        Ok(classify(status, body))
    }
}

fn classify(status: u16, body: Option<Value>) -> SubmitOutcome {
    let str_field = |key: &str| {
        body.as_ref()
            .and_then(|b| b.get(key))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    let succeeded = body
        .as_ref()
        .and_then(|b| b.get("success"))
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    if (200..300).contains(&status) && succeeded {
        return SubmitOutcome::Accepted {
            message: str_field("message").unwrap_or_default(),
            job_id: str_field("job_id"),
            redirect_url: str_field("redirect_url"),
        };
    }

    let mut message = str_field("error")
        .or_else(|| str_field("details"))
        .unwrap_or_else(|| format!("Request failed with status {status}."));

    let missing: Vec<&str> = body
        .as_ref()
        .and_then(|b| b.get("missingFields"))
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();
    if !missing.is_empty() {
        message.push_str(&format!(" Missing fields: {}", missing.join(", ")));
    }

    SubmitOutcome::Rejected { status, message }
}
