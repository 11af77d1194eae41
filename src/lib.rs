pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod poller;
pub mod rate_limit;
pub mod render;
pub mod routes;
pub mod state;
pub mod store;
pub mod submission;
pub mod views;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::forms::FormRegistry;
use crate::rate_limit::SubmissionRateLimiter;
use crate::state::{AppState, SharedState};
use crate::store::JobStore;
use crate::submission::relay::WebhookRelay;

pub fn build_app(config: Config, store: Arc<dyn JobStore>) -> Result<(Router, SharedState), String> {
    let relay = WebhookRelay::new(&config.webhook_base_url, config.webhook_timeout_secs)
        .map_err(|e| e.to_string())?;

    let forms = FormRegistry::with_catalog();
    for form in forms.list() {
        tracing::debug!("Form {} -> {}", form.slug, form.webhook_url(&config.webhook_base_url));
    }

    let state: SharedState = Arc::new(AppState {
        submission_limiter: SubmissionRateLimiter::new(
            config.submission_rate_limit,
            config.submission_rate_window_secs,
        ),
        relay,
        store,
        forms,
        config,
    });

    // Security headers
    let app = Router::new()
        .merge(routes::api_routes())
        .merge(views::view_routes())
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state.clone());

    Ok((app, state))
}

async fn health() -> &'static str {
    "ok"
}
