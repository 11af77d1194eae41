use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRecord {
    pub job_id: String,
    #[serde(default)]
    pub html_content: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ReportRecord {
    /// Stored HTML, treating an empty column as absent.
    pub fn html(&self) -> Option<&str> {
        self.html_content
            .as_deref()
            .filter(|html| !html.trim().is_empty())
    }

    /// Accepts both `timestamptz` and bare `timestamp` column renderings.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.updated_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }
}
