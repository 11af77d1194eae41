pub mod rest;

use async_trait::async_trait;
use serde::Deserialize;

use crate::models::{JobRecord, ReportRecord};

pub use rest::RestStore;

#[derive(Debug)]
pub enum StoreError {
    Transport(reqwest::Error),
    Status { status: u16, body: String },
    Decode(reqwest::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Transport(e) => write!(f, "store request failed: {e}"),
            StoreError::Status { status, body } => {
                write!(f, "store request failed with status {status}: {body}")
            }
            StoreError::Decode(e) => write!(f, "store response could not be decoded: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Status column of a `jobs` row.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRow {
    #[serde(default)]
    pub status: Option<String>,
}

/// Read-only view of the state the workflow system persists.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn job_status(&self, job_id: &str) -> Result<Option<StatusRow>, StoreError>;
    async fn find_job(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError>;
    async fn find_report(
        &self,
        table: &str,
        job_id: &str,
    ) -> Result<Option<ReportRecord>, StoreError>;
}
