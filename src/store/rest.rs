use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use crate::config::StoreConfig;
use crate::models::{JobRecord, ReportRecord};

use super::{JobStore, StatusRow, StoreError};

const JOBS_TABLE: &str = "jobs";

/// PostgREST client authenticated with the service-role key.
pub struct RestStore {
    client: reqwest::Client,
    endpoint: String,
    service_role_key: String,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(StoreError::Transport)?;

        Ok(Self {
            client,
            endpoint: config.rest_endpoint(),
            service_role_key: config.service_role_key.clone(),
        })
    }

    /// Fetch at most one row of `table` where `column` equals `value`.
    async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        column: &str,
        value: &str,
    ) -> Result<Option<T>, StoreError> {
        let url = format!("{}/{table}", self.endpoint);
        let filter = format!("eq.{value}");

        let resp = self
            .client
            .get(&url)
            .query(&[("select", select), (column, filter.as_str()), ("limit", "1")])
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .header(ACCEPT, "application/json")
            .header("Prefer", "count=none")
            .send()
            .await
            .map_err(StoreError::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let mut rows: Vec<T> = resp.json().await.map_err(StoreError::Decode)?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.swap_remove(0)))
        }
    }
}

#[async_trait]
impl JobStore for RestStore {
    async fn job_status(&self, job_id: &str) -> Result<Option<StatusRow>, StoreError> {
        self.select_one(JOBS_TABLE, "status", "id", job_id).await
    }

    async fn find_job(&self, job_id: &str) -> Result<Option<JobRecord>, StoreError> {
        self.select_one(
            JOBS_TABLE,
            "id,status,input_data,output_data,created_at,updated_at",
            "id",
            job_id,
        )
        .await
    }

    async fn find_report(
        &self,
        table: &str,
        job_id: &str,
    ) -> Result<Option<ReportRecord>, StoreError> {
        self.select_one(table, "job_id,html_content,updated_at", "job_id", job_id)
            .await
    }
}
