pub mod catalog;

use std::collections::HashMap;

/// Inbound form field name paired with the name the workflow expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub inbound: &'static str,
    pub outbound: &'static str,
}

pub const fn field(inbound: &'static str, outbound: &'static str) -> FieldMap {
    FieldMap { inbound, outbound }
}

/// How the payload travels to the webhook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// GET with every payload entry as a query parameter.
    Query,
    /// POST with the payload as a JSON object body.
    Json,
}

#[derive(Debug)]
pub struct FormDefinition {
    pub slug: &'static str,
    pub title: &'static str,
    pub webhook_path: &'static str,
    pub transport: Transport,
    pub required: &'static [FieldMap],
    pub optional: &'static [FieldMap],
    /// Whether submissions get a job id minted here and forwarded as `job_id`.
    pub tracks_jobs: bool,
    pub report_table: &'static str,
    /// Key in the job's `output_data` holding Markdown used when no HTML report exists.
    pub markdown_field: Option<&'static str>,
    /// Outbound keys looked up on the job record for the report subtitle.
    pub label_fields: &'static [&'static str],
}

impl FormDefinition {
    pub fn webhook_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.webhook_path)
    }

    pub fn report_path(&self, job_id: &str) -> String {
        format!("/{}/{job_id}", self.slug)
    }
}

pub struct FormRegistry {
    forms: HashMap<&'static str, &'static FormDefinition>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self {
            forms: HashMap::new(),
        }
    }

    /// Registry holding every form in the catalog.
    pub fn with_catalog() -> Self {
        let mut registry = Self::new();
        for form in catalog::ALL {
            registry.register(form);
        }
        registry
    }

    pub fn register(&mut self, form: &'static FormDefinition) {
        self.forms.insert(form.slug, form);
    }

    pub fn get(&self, slug: &str) -> Option<&'static FormDefinition> {
        self.forms.get(slug).copied()
    }

    pub fn list(&self) -> Vec<&'static FormDefinition> {
        let mut forms: Vec<_> = self.forms.values().copied().collect();
        forms.sort_by_key(|f| f.slug);
        forms
    }
}

impl Default for FormRegistry {
    fn default() -> Self {
        Self::with_catalog()
    }
}
