use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::forms::catalog::{JOB_ID, TIMESTAMP};
use crate::forms::FormDefinition;

/// Trimmed string for string values; anything else (or nothing) is empty.
pub fn normalize(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    }
}

/// Outbound names of required fields that are empty after normalization, in catalog order.
pub fn missing_required(form: &FormDefinition, payload: &Map<String, Value>) -> Vec<&'static str> {
    form.required
        .iter()
        .filter(|f| normalize(payload.get(f.inbound)).is_empty())
        .map(|f| f.outbound)
        .collect()
}

/// Payload as the workflow receives it, keeping insertion order for query strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPayload {
    entries: Vec<(String, String)>,
}

impl OutboundPayload {
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }

    fn push(&mut self, key: &str, value: String) {
        self.entries.push((key.to_string(), value));
    }
}

/// Build the outbound payload. Required fields are copied as-is (callers
/// validate first), empty optional fields are dropped, `job_id` is added when
/// given, and `timestamp` is always present.
pub fn outbound_payload(
    form: &FormDefinition,
    payload: &Map<String, Value>,
    now: DateTime<Utc>,
    job_id: Option<&str>,
) -> OutboundPayload {
    let mut out = OutboundPayload {
        entries: Vec::with_capacity(form.required.len() + form.optional.len() + 2),
    };

    for f in form.required {
        out.push(f.outbound, normalize(payload.get(f.inbound)));
    }

    for f in form.optional {
        let value = normalize(payload.get(f.inbound));
        if !value.is_empty() {
            out.push(f.outbound, value);
        }
    }

    if let Some(id) = job_id {
        out.push(JOB_ID, id.to_string());
    }

    let timestamp = normalize(payload.get(TIMESTAMP.inbound));
    let timestamp = if timestamp.is_empty() {
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    } else {
        timestamp
    };
    out.push(TIMESTAMP.outbound, timestamp);

    out
}
