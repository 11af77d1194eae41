use std::sync::Arc;

use crate::config::Config;
use crate::forms::FormRegistry;
use crate::rate_limit::SubmissionRateLimiter;
use crate::store::JobStore;
use crate::submission::relay::WebhookRelay;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub forms: FormRegistry,
    pub relay: WebhookRelay,
    pub store: Arc<dyn JobStore>,
    pub submission_limiter: SubmissionRateLimiter,
}
