use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::forms::{FormDefinition, Transport};

use super::fields::OutboundPayload;

#[derive(Debug)]
pub struct RelayError {
    pub message: String,
}

impl std::fmt::Display for RelayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<String> for RelayError {
    fn from(s: String) -> Self {
        RelayError { message: s }
    }
}

/// What the webhook answered. `json` is `None` when the body was empty or not JSON.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: u16,
    pub text: String,
    pub json: Option<Value>,
}

impl RelayResponse {
    /// 2xx and the body does not explicitly say `success: false`.
    pub fn accepted(&self) -> bool {
        let flagged_failure = self
            .json
            .as_ref()
            .and_then(|v| v.get("success"))
            .and_then(|v| v.as_bool())
            == Some(false);
        (200..300).contains(&self.status) && !flagged_failure
    }

    /// String field of the parsed body, ignoring empty strings.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.json
            .as_ref()
            .and_then(|v| v.get(key))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

pub struct WebhookRelay {
    client: reqwest::Client,
    base_url: String,
}

impl WebhookRelay {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| RelayError::from(format!("Failed to build webhook client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    /// Send one payload to the form's webhook. Only transport failures are
    /// errors; any HTTP answer is returned for the caller to interpret.
    pub async fn deliver(
        &self,
        form: &FormDefinition,
        payload: &OutboundPayload,
    ) -> Result<RelayResponse, RelayError> {
        let url = form.webhook_url(&self.base_url);

        let req = match form.transport {
            Transport::Query => self.client.get(&url).query(payload.entries()),
            Transport::Json => self.client.post(&url).json(&payload.to_json()),
        };

        tracing::debug!("[proxy] Delivering {} payload to {url}", form.slug);

        let resp = req
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| RelayError::from(format!("Webhook request failed: {e}")))?;

        let status = resp.status().as_u16();
        let text = resp
            .text()
            .await
            .map_err(|e| RelayError::from(format!("Failed to read webhook response: {e}")))?;

        tracing::info!("[proxy] Webhook response for {}: {status}", form.slug);
        tracing::debug!("[proxy] Webhook response body: {text}");

        let json = if text.trim().is_empty() {
            None
        } else {
            match serde_json::from_str::<Value>(&text) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("[proxy] Failed to parse webhook response JSON: {e}");
                    None
                }
            }
        };

        Ok(RelayResponse { status, text, json })
    }
}
