use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Processing state of an externally owned job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Error,
    Failed,
    NotFound,
    Other(String),
}

impl JobStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "pending" => JobStatus::Pending,
            "processing" => JobStatus::Processing,
            "completed" => JobStatus::Completed,
            "error" => JobStatus::Error,
            "failed" => JobStatus::Failed,
            "not_found" => JobStatus::NotFound,
            other => JobStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
            JobStatus::Failed => "failed",
            JobStatus::NotFound => "not_found",
            JobStatus::Other(s) => s,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::Error | JobStatus::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        JobStatus::parse(&s)
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row of the `jobs` table. `input_data` and `output_data` are opaque blobs
/// written by the workflow; they arrive either as JSON objects or as
/// JSON-encoded strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub input_data: Option<Value>,
    #[serde(default)]
    pub output_data: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl JobRecord {
    pub fn is_completed(&self) -> bool {
        self.status.as_deref().map(JobStatus::parse) == Some(JobStatus::Completed)
    }

    pub fn input(&self) -> Option<Map<String, Value>> {
        parse_blob(self.input_data.as_ref())
    }

    pub fn output(&self) -> Option<Map<String, Value>> {
        parse_blob(self.output_data.as_ref())
    }

    /// First string value for `key`, looking at the input blob before the output blob.
    pub fn lookup_str(&self, key: &str) -> Option<String> {
        [self.input(), self.output()]
            .into_iter()
            .flatten()
            .find_map(|blob| blob.get(key).and_then(|v| v.as_str()).map(|s| s.to_string()))
            .filter(|s| !s.trim().is_empty())
    }
}

fn parse_blob(value: Option<&Value>) -> Option<Map<String, Value>> {
    match value? {
        Value::Object(map) => Some(map.clone()),
        Value::String(s) if !s.is_empty() => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Failed to parse job blob as JSON: {e}");
                None
            }
        },
        _ => None,
    }
}
