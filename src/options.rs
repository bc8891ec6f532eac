use std::time::Duration;

use crate::{ApiError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_ACCEPT: &str = "application/vnd.github+json";
pub const DEFAULT_API_VERSION: &str = "2022-11-28";

/// Largest exponent applied to the backoff multiplier.
const MAX_BACKOFF_EXPONENT: usize = 16;

/// Controls how transient failures are retried.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Factor applied per attempt. Must be at least `1.0`.
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            ..Self::default()
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(0, Self::default().base_delay)
    }

    pub fn with_multiplier(mut self, backoff_multiplier: f64) -> Self {
        self.backoff_multiplier = backoff_multiplier;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_delay.is_zero() {
            return Err(ApiError::InvalidInput(
                "retry base delay must be positive".to_owned(),
            ));
        }
        if !self.backoff_multiplier.is_finite() || self.backoff_multiplier < 1.0 {
            return Err(ApiError::InvalidInput(format!(
                "backoff multiplier must be a finite value >= 1, got {}",
                self.backoff_multiplier
            )));
        }
        Ok(())
    }

    /// Delay slept after failed attempt `attempt` (zero-based).
    ///
    /// `base_delay * backoff_multiplier^attempt`, exponent clamped at 16,
    /// saturating at `Duration::MAX`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exp = attempt.min(MAX_BACKOFF_EXPONENT) as i32;
        let factor = self.backoff_multiplier.max(1.0).powi(exp);
        let nanos = self.base_delay.as_nanos() as f64 * factor;
        if !nanos.is_finite() || nanos >= u64::MAX as f64 {
            return Duration::MAX;
        }
        Duration::from_nanos(nanos.round() as u64)
    }

    /// Sum of the delays slept across `retries` retries.
    pub fn total_backoff(&self, retries: usize) -> Duration {
        (0..retries).fold(Duration::ZERO, |total, attempt| {
            total.saturating_add(self.delay_for(attempt))
        })
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        }
    }
}

/// Configures timeout, default headers and the default retry policy.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    pub user_agent: String,
    pub accept: String,
    /// Sent as `X-GitHub-Api-Version`. Empty disables the header.
    pub api_version: String,
    /// Policy used by [`crate::ApiCaller::send`].
    pub retry: RetryPolicy,
}

impl ClientOptions {
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(ApiError::InvalidInput(
                "per-attempt timeout must be positive".to_owned(),
            ));
        }
        Ok(())
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: concat!("ghapi-http/", env!("CARGO_PKG_VERSION")).to_owned(),
            accept: DEFAULT_ACCEPT.to_owned(),
            api_version: DEFAULT_API_VERSION.to_owned(),
            retry: RetryPolicy::default(),
        }
    }
}
