pub mod report;

use axum::http::{header, HeaderValue};
use axum::routing::get;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::state::SharedState;

/// Stored report HTML is rendered unsanitised, so report pages never run scripts.
const REPORT_CSP: &str = "default-src 'self'; script-src 'none'; object-src 'none'; \
    base-uri 'none'; form-action 'none'; style-src 'self' 'unsafe-inline'; img-src * data:";

pub fn view_routes() -> Router<SharedState> {
    Router::new()
        .route("/{form}/{job_id}", get(report::show))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(REPORT_CSP),
        ))
}
