pub mod job_status;
pub mod reports;
pub mod submit;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Job status
        .route("/api/job-status/{job_id}", get(job_status::job_status))
        // Reports
        .route("/api/reports/{form}/{job_id}", get(reports::get))
        // Form submissions
        .route("/api/{form}", post(submit::submit))
}
