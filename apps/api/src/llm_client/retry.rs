//! Retry orchestration around a single provider call.
//!
//! Every attempt, retries included, first acquires from the shared [`CallBudgetTracker`].
//! The tracker keeps us from overrunning the quota we know about; this layer absorbs the
//! throttling we don't (the provider's real limit may differ from the configured one).

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

use super::budget::CallBudgetTracker;
use super::{GenerationBackend, GenerationError, LlmError};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Base delay for the first rate-limit backoff; doubles per attempt.
    pub initial_delay: Duration,
    /// Uniform random delay added on top of every rate-limit backoff.
    pub jitter: Range<Duration>,
    /// Linear step for timeout retries: `timeout_delay * attempt`.
    pub timeout_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            initial_delay: Duration::from_secs(15),
            jitter: Duration::from_secs(2)..Duration::from_secs(8),
            timeout_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Deterministic part of the rate-limit backoff for a 1-based attempt.
    pub fn rate_limit_base(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_delay.saturating_mul(1u32 << exponent)
    }

    /// Full rate-limit backoff: `initial_delay * 2^(attempt-1)` plus jitter.
    pub fn rate_limit_backoff<R: Rng + ?Sized>(&self, attempt: u32, rng: &mut R) -> Duration {
        let jitter = if self.jitter.start < self.jitter.end {
            rng.gen_range(self.jitter.clone())
        } else {
            self.jitter.start
        };
        self.rate_limit_base(attempt) + jitter
    }

    pub fn timeout_backoff(&self, attempt: u32) -> Duration {
        self.timeout_delay.saturating_mul(attempt)
    }
}

pub struct RetryOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    budget: Arc<CallBudgetTracker>,
    policy: RetryPolicy,
}

impl RetryOrchestrator {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        budget: Arc<CallBudgetTracker>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            backend,
            budget,
            policy: RetryPolicy {
                max_attempts: policy.max_attempts.max(1),
                ..policy
            },
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn budget(&self) -> &CallBudgetTracker {
        &self.budget
    }

    pub fn backend(&self) -> &dyn GenerationBackend {
        self.backend.as_ref()
    }

    /// Sends `prompt` to the provider, retrying retryable failures per policy.
    pub async fn invoke(&self, prompt: &str) -> Result<String, LlmError> {
        let max_attempts = self.policy.max_attempts;

        for attempt in 1..=max_attempts {
            self.budget.acquire().await;

            if attempt > 1 {
                debug!(attempt, max_attempts, "Retrying provider call");
            }

            let error = match self.backend.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => e,
            };

            let exhausted = attempt == max_attempts;

            match error {
                GenerationError::RateLimited(message) => {
                    if exhausted {
                        warn!(attempts = attempt, "Provider rate limit persisted, giving up");
                        return Err(LlmError::RateLimitExceeded { attempts: attempt });
                    }
                    let backoff = self
                        .policy
                        .rate_limit_backoff(attempt, &mut rand::thread_rng());
                    warn!(
                        error = %message,
                        attempt,
                        max_attempts,
                        backoff_secs = backoff.as_secs_f64(),
                        "Provider rate limited, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    // The provider's cool-down is authoritative over our local window.
                    self.budget.reset_window().await;
                }
                GenerationError::Timeout(message) => {
                    if exhausted {
                        warn!(attempts = attempt, "Provider kept timing out, giving up");
                        return Err(LlmError::Timeout { attempts: attempt });
                    }
                    let backoff = self.policy.timeout_backoff(attempt);
                    warn!(
                        error = %message,
                        attempt,
                        max_attempts,
                        backoff_secs = backoff.as_secs_f64(),
                        "Provider timed out, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                GenerationError::Fatal(message) => {
                    return Err(LlmError::Provider(message));
                }
            }
        }

        // max_attempts >= 1 and every arm of the last attempt returns.
        Err(LlmError::RateLimitExceeded {
            attempts: max_attempts,
        })
    }
}
