//! Client side of a submission: wait for an externally processed job to
//! reach a terminal status by polling the job-status endpoint.

pub mod http;

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::models::JobStatus;

pub use http::{HttpStatusSource, SubmitClient, SubmitOutcome};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_REDIRECT_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    NotStarted,
    Pending,
    Success,
    Error,
}

/// Status text shown to the user after each step.
#[derive(Debug, Clone)]
pub struct PollUpdate {
    pub state: PollState,
    pub attempt: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed { redirect: String },
    Failed { message: String },
    /// Attempt budget spent without a terminal status; the job may still finish.
    TimedOut { message: String },
    Cancelled,
}

#[derive(Debug)]
pub enum PollError {
    Transport(String),
    InvalidResponse(String),
}

impl std::fmt::Display for PollError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PollError::Transport(msg) => write!(f, "Status request failed: {msg}"),
            PollError::InvalidResponse(msg) => write!(f, "Unexpected status response: {msg}"),
        }
    }
}

impl std::error::Error for PollError {}

#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &str) -> Result<JobStatus, PollError>;
}

/// Bounded, fixed-interval poll. No backoff, no jitter, one request at a time.
pub struct Poller<S> {
    source: S,
    max_attempts: u32,
    interval: Duration,
    redirect_delay: Duration,
    state: PollState,
}

impl<S: StatusSource> Poller<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
            redirect_delay: DEFAULT_REDIRECT_DELAY,
            state: PollState::NotStarted,
        }
    }

    pub fn with_timing(mut self, max_attempts: u32, interval: Duration, redirect_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.interval = interval;
        self.redirect_delay = redirect_delay;
        self
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Upper bound on time spent sleeping between attempts.
    pub fn ceiling(&self) -> Duration {
        self.interval * self.max_attempts
    }

    /// Poll `job_id` until it completes, fails, the budget runs out, or
    /// `cancel` flips to true (or its sender goes away).
    pub async fn run<F>(
        &mut self,
        job_id: &str,
        email: &str,
        redirect: String,
        mut cancel: watch::Receiver<bool>,
        mut on_update: F,
    ) -> PollOutcome
    where
        F: FnMut(&PollUpdate),
    {
        self.state = PollState::Pending;

        for attempt in 1..=self.max_attempts {
            if *cancel.borrow() {
                return PollOutcome::Cancelled;
            }

            tracing::debug!("[poll] Checking status of {job_id} (attempt {attempt})");

            let status = match self.source.fetch_status(job_id).await {
                Ok(status) => status,
                Err(e) => {
                    tracing::warn!("[poll] {e}");
                    let message = e.to_string();
                    self.emit(PollState::Error, attempt, &message, &mut on_update);
                    return PollOutcome::Failed { message };
                }
            };

            if status == JobStatus::Completed {
                self.emit(
                    PollState::Success,
                    attempt,
                    "Generation complete! Your content is ready. Redirecting...",
                    &mut on_update,
                );
                // Completion is already known; cancellation only skips the pause.
                tokio::select! {
                    _ = tokio::time::sleep(self.redirect_delay) => {}
                    _ = cancel.changed() => {}
                }
                return PollOutcome::Completed { redirect };
            }

            if status.is_failure() {
                let message =
                    format!("Generation failed. Please contact support with job ID: {job_id}");
                self.emit(PollState::Error, attempt, &message, &mut on_update);
                return PollOutcome::Failed { message };
            }

            if attempt >= self.max_attempts {
                tracing::info!("[poll] Max attempts reached for {job_id}, stopping");
                let message = format!(
                    "Generation is taking longer than expected. We'll email you at {email} when it's ready. (Job ID: {job_id})"
                );
                self.emit(PollState::Pending, attempt, &message, &mut on_update);
                return PollOutcome::TimedOut { message };
            }

            let message = format!(
                "Generating your content ({} elapsed)... Hang tight!",
                format_elapsed(self.interval * attempt)
            );
            self.emit(PollState::Pending, attempt, &message, &mut on_update);

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        return PollOutcome::Cancelled;
                    }
                }
            }
        }

        // max_attempts >= 1, so the loop always returns.
        PollOutcome::Cancelled
    }

    fn emit<F: FnMut(&PollUpdate)>(&mut self, state: PollState, attempt: u32, message: &str, on_update: &mut F) {
        self.state = state;
        on_update(&PollUpdate {
            state,
            attempt,
            message: message.to_string(),
        });
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let (minutes, seconds) = (secs / 60, secs % 60);
    if minutes > 0 {
        format!("{minutes} min {seconds} sec")
    } else {
        format!("{seconds} sec")
    }
}
