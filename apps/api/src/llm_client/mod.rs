/// LLM Client: the single point of entry for every text-generation call in the matcher.
///
/// ARCHITECTURAL RULE: No other module may talk to the provider directly.
/// Every call goes budget → retry → sanitize through `LlmClient`.
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

pub mod budget;
pub mod http;
pub mod prompts;
pub mod retry;
pub mod sanitize;

#[cfg(test)]
pub(crate) mod testing;

use budget::{BudgetSnapshot, CallBudgetTracker};
use retry::{RetryOrchestrator, RetryPolicy};

static RATE_LIMIT_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Failure of a single provider attempt, as reported by the transport.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("provider timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    Fatal(String),
}

impl GenerationError {
    /// Heuristic classification of an untyped provider error message.
    ///
    /// Only for the boundary where the transport cannot tell us what happened
    /// (e.g. a 5xx body or a client library error string). Not a contract.
    pub fn classify(message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        // Bare "rate" only as a whole word, so "generate" stays fatal.
        let rate_limit = RATE_LIMIT_PATTERN.get_or_init(|| {
            Regex::new(r"\brate\b|rate_limit|ratelimit|limit|429|quota")
                .expect("rate limit pattern is valid")
        });

        if rate_limit.is_match(&lower) {
            GenerationError::RateLimited(message)
        } else if lower.contains("timeout") || lower.contains("timed out") {
            GenerationError::Timeout(message)
        } else {
            GenerationError::Fatal(message)
        }
    }
}

/// Terminal error surfaced to callers once the retry policy is exhausted.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimitExceeded { attempts: u32 },

    #[error("Provider timed out after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// A text-generation provider. One call, one attempt.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    fn provider(&self) -> &str;
    fn model(&self) -> &str;
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrySummary {
    pub max_attempts: u32,
    pub initial_delay_secs: f64,
    pub jitter_secs: (f64, f64),
    pub timeout_delay_secs: f64,
}

impl From<&RetryPolicy> for RetrySummary {
    fn from(policy: &RetryPolicy) -> Self {
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_secs: policy.initial_delay.as_secs_f64(),
            jitter_secs: (
                policy.jitter.start.as_secs_f64(),
                policy.jitter.end.as_secs_f64(),
            ),
            timeout_delay_secs: policy.timeout_delay.as_secs_f64(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientStatus {
    pub provider: String,
    pub model: String,
    pub budget: BudgetSnapshot,
    pub retry: RetrySummary,
}

/// The single LLM client shared by all services. Cheap to clone.
#[derive(Clone)]
pub struct LlmClient {
    orchestrator: Arc<RetryOrchestrator>,
}

impl LlmClient {
    pub fn new(
        backend: Arc<dyn GenerationBackend>,
        budget: Arc<CallBudgetTracker>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            orchestrator: Arc::new(RetryOrchestrator::new(backend, budget, policy)),
        }
    }

    /// Raw text from the provider, after budget gating and retries.
    pub async fn call(&self, prompt: &str) -> Result<String, LlmError> {
        self.orchestrator.invoke(prompt).await
    }

    /// Calls the provider and deserializes the sanitized response.
    /// The prompt must instruct the model to return JSON.
    pub async fn call_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, LlmError> {
        let text = self.call(prompt).await?;
        sanitize::parse_structured_as(&text)
    }

    pub async fn status(&self) -> ClientStatus {
        let backend = self.orchestrator.backend();
        ClientStatus {
            provider: backend.provider().to_string(),
            model: backend.model().to_string(),
            budget: self.orchestrator.budget().snapshot().await,
            retry: RetrySummary::from(self.orchestrator.policy()),
        }
    }

    /// Manual escape hatch: forget all recorded calls.
    pub async fn reset_budget(&self) {
        self.orchestrator.budget().reset().await;
    }
}
