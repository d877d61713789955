//! Retry and error wording for range submission.
//!
//! The state machine never retries on its own. A host that wants retries
//! wraps its transport-backed submitter in [`RetryingSubmitter`].

use std::time::Duration;

use crate::error::SubmitError;
use crate::ports::RangeSubmitter;
use crate::selection::WireRange;

/// Statuses worth another attempt: timeouts, rate limits, upstream errors.
pub const RETRYABLE_STATUSES: [u16; 6] = [408, 429, 500, 502, 503, 504];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub retryable_statuses: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay: Duration::from_millis(1000),
            retryable_statuses: RETRYABLE_STATUSES.to_vec(),
        }
    }
}

impl RetryPolicy {
    /// Network errors always qualify; HTTP errors only for listed statuses.
    pub fn is_retryable(&self, err: &SubmitError) -> bool {
        match err {
            SubmitError::Network(_) => true,
            SubmitError::Http { status, .. } => self.retryable_statuses.contains(status),
            SubmitError::Rejected(_) => false,
        }
    }
}

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Submitter decorator that retries transient failures with a fixed delay.
pub struct RetryingSubmitter<S, Z = ThreadSleeper> {
    inner: S,
    policy: RetryPolicy,
    sleeper: Z,
}

impl<S: RangeSubmitter> RetryingSubmitter<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self {
            inner,
            policy,
            sleeper: ThreadSleeper,
        }
    }
}

impl<S: RangeSubmitter, Z: Sleeper> RetryingSubmitter<S, Z> {
    pub fn with_sleeper(inner: S, policy: RetryPolicy, sleeper: Z) -> Self {
        Self { inner, policy, sleeper }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<S: RangeSubmitter, Z: Sleeper> RangeSubmitter for RetryingSubmitter<S, Z> {
    fn submit(&self, range: &WireRange) -> Result<serde_json::Value, SubmitError> {
        let mut attempt = 0;
        loop {
            match self.inner.submit(range) {
                Ok(payload) => return Ok(payload),
                Err(err) if attempt < self.policy.max_retries && self.policy.is_retryable(&err) => {
                    attempt += 1;
                    log::warn!(
                        "range submission failed ({}), retry {}/{} in {:?}",
                        err,
                        attempt,
                        self.policy.max_retries,
                        self.policy.retry_delay
                    );
                    self.sleeper.sleep(self.policy.retry_delay);
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Human-readable message for a submission failure.
///
/// A message from the backend wins; otherwise a fixed phrase per status.
pub fn format_error_message(err: &SubmitError, default_message: &str) -> String {
    match err {
        SubmitError::Rejected(message) => message.clone(),
        SubmitError::Http { message: Some(message), .. } => message.clone(),
        SubmitError::Http { status, message: None } => match status {
            400 => "Bad request, check the input".to_string(),
            401 => "Not authorized, sign in again".to_string(),
            403 => "Access to this resource is forbidden".to_string(),
            404 => "The file no longer exists or has expired, upload it again".to_string(),
            408 => "Request timed out, try again later".to_string(),
            429 => "Too many requests, try again later".to_string(),
            500 => "Internal server error, try again later".to_string(),
            502 => "Bad gateway, try again later".to_string(),
            503 => "Service unavailable, try again later".to_string(),
            504 => "Gateway timed out, try again later".to_string(),
            _ => default_message.to_string(),
        },
        SubmitError::Network(_) => "Network error, check the connection".to_string(),
    }
}
