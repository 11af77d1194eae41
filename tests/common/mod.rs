use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use formrelay::config::{Config, StoreConfig};
use formrelay::state::SharedState;
use formrelay::store::RestStore;

pub const SERVICE_ROLE_KEY: &str = "test-service-role-key";

/// A running server wired to mock webhook and store backends.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub webhook: MockServer,
    pub store: MockServer,
    #[allow(dead_code)]
    pub state: SharedState,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Submit a JSON payload to a form, return (body, status).
    pub async fn submit_json(&self, form: &str, data: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(&format!("/api/{form}")))
            .json(data)
            .send()
            .await
            .expect("submit json failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit form-urlencoded data to a form, return (body, status).
    #[allow(dead_code)]
    pub async fn submit_form(&self, form: &str, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(&format!("/api/{form}")))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// GET a JSON endpoint, return (body, status).
    #[allow(dead_code)]
    pub async fn get_json(&self, path: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Requests the webhook mock has seen so far.
    pub async fn webhook_requests(&self) -> Vec<wiremock::Request> {
        self.webhook.received_requests().await.unwrap_or_default()
    }

    /// Serve `rows` for a single-row lookup on `table` where `column = value`.
    #[allow(dead_code)]
    pub async fn mount_rows(&self, table: &str, column: &str, value: &str, rows: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/rest/v1/{table}")))
            .and(query_param(column, format!("eq.{value}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(rows))
            .mount(&self.store)
            .await;
    }

    #[allow(dead_code)]
    pub async fn mount_job(&self, job_id: &str, job: Value) {
        self.mount_rows("jobs", "id", job_id, json!([job])).await;
    }

    #[allow(dead_code)]
    pub async fn mount_report(&self, table: &str, job_id: &str, report: Value) {
        self.mount_rows(table, "job_id", job_id, json!([report])).await;
    }
}

/// Canonical competitor-brief submission with every optional field left empty.
#[allow(dead_code)]
pub fn acme_brief() -> Value {
    json!({
        "companyName": "Acme",
        "productName": "Widget",
        "productCategory": "SaaS",
        "features": "x",
        "target": "SMB",
        "email": "a@b.com",
        "productSubcategory": "",
        "price": "",
        "depth": "",
        "competitors": "",
        "urls": "",
        "concerns": "",
    })
}

#[allow(dead_code)]
pub fn lead_nurture() -> Value {
    json!({
        "companyName": "Acme",
        "productService": "B2B analytics platform",
        "industry": "saas",
        "targetAudience": "Ops leaders",
        "sequenceGoal": "Book demos",
        "brandVoice": "Friendly",
        "email": "a@b.com",
        "sequenceLength": "5",
    })
}

#[allow(dead_code)]
pub fn re_engagement() -> Value {
    json!({
        "jobId": "client-side-id-is-ignored",
        "companyName": "Acme",
        "productService": "Online courses",
        "industry": "education",
        "email": "a@b.com",
        "inactivityPeriod": "60-90",
        "listSize": "5000",
        "primaryGoal": "Reactivate",
        "brandVoice": "Warm",
        "incentive": "",
        "sequenceLength": "3",
    })
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

/// Spawn a server on a random port; `customize` can adjust config first.
pub async fn spawn_app_with<F: FnOnce(&mut Config)>(customize: F) -> TestApp {
    let webhook = MockServer::start().await;
    let store = MockServer::start().await;

    // Anything not mounted explicitly is an empty result set.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .with_priority(u8::MAX)
        .mount(&store)
        .await;

    let mut config = Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        base_url: "http://localhost:0".to_string(),
        store: StoreConfig {
            url: store.uri(),
            service_role_key: SERVICE_ROLE_KEY.to_string(),
            timeout_secs: 5,
        },
        webhook_base_url: format!("{}/webhook", webhook.uri()),
        webhook_timeout_secs: 5,
        max_body_size: 65_536,
        submission_rate_limit: 0,
        submission_rate_window_secs: 600,
        trusted_proxies: vec![],
        log_level: "warn".to_string(),
    };
    customize(&mut config);

    let rest_store = RestStore::new(&config.store).expect("Failed to build store client");
    let (app, state) =
        formrelay::build_app(config, Arc::new(rest_store)).expect("Failed to build app");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        webhook,
        store,
        state,
    }
}
