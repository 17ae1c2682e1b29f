use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::evaluation::evaluator::EvaluationOptions;
use crate::llm_client::budget::BudgetConfig;
use crate::llm_client::http::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::llm_client::retry::RetryPolicy;

/// Application configuration loaded from environment variables.
/// Every variable has a default; without `LLM_API_KEY` rationales are generated locally.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_request_timeout: Duration,
    pub budget: BudgetConfig,
    pub retry: RetryPolicy,
    pub enable_llm_reasoning: bool,
    pub evaluation: EvaluationOptions,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let jitter_min = secs(parse_or(&get, "LLM_RETRY_JITTER_MIN_SECS", 2.0)?)?;
        let jitter_max = secs(parse_or(&get, "LLM_RETRY_JITTER_MAX_SECS", 8.0)?)?;
        if jitter_min > jitter_max {
            bail!("LLM_RETRY_JITTER_MIN_SECS must not exceed LLM_RETRY_JITTER_MAX_SECS");
        }

        let calls_per_minute: u32 = parse_or(&get, "LLM_CALLS_PER_MINUTE", 20)?;
        if calls_per_minute == 0 {
            bail!("LLM_CALLS_PER_MINUTE must be at least 1");
        }

        Ok(Config {
            llm_api_key: get("LLM_API_KEY"),
            llm_base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            llm_model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            llm_request_timeout: secs(parse_or(&get, "LLM_REQUEST_TIMEOUT_SECS", 120.0)?)?,
            budget: BudgetConfig {
                calls_per_minute,
                min_delay: secs(parse_or(&get, "LLM_MIN_CALL_DELAY_SECS", 4.0)?)?,
            },
            retry: RetryPolicy {
                max_attempts: parse_or(&get, "LLM_MAX_ATTEMPTS", 4)?,
                initial_delay: secs(parse_or(&get, "LLM_INITIAL_RETRY_DELAY_SECS", 15.0)?)?,
                jitter: jitter_min..jitter_max,
                timeout_delay: secs(parse_or(&get, "LLM_TIMEOUT_RETRY_DELAY_SECS", 10.0)?)?,
            },
            enable_llm_reasoning: parse_or(&get, "ENABLE_LLM_REASONING", true)?,
            evaluation: EvaluationOptions {
                reasoning_tier_adjustment: parse_or(
                    &get,
                    "ENABLE_REASONING_TIER_ADJUSTMENT",
                    true,
                )?,
            },
            port: parse_or(&get, "PORT", 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        None => Ok(default),
    }
}

fn secs(value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).context("durations must be finite and non-negative")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.llm_api_key, None);
        assert_eq!(config.llm_model, DEFAULT_MODEL);
        assert_eq!(config.port, 8080);
        assert_eq!(config.budget.calls_per_minute, 20);
        assert_eq!(config.budget.min_delay, Duration::from_secs(4));
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.initial_delay, Duration::from_secs(15));
        assert_eq!(
            config.retry.jitter,
            Duration::from_secs(2)..Duration::from_secs(8)
        );
        assert!(config.enable_llm_reasoning);
        assert!(config.evaluation.reasoning_tier_adjustment);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("LLM_API_KEY", "gsk_test"),
            ("LLM_CALLS_PER_MINUTE", "5"),
            ("LLM_MIN_CALL_DELAY_SECS", "0.5"),
            ("ENABLE_REASONING_TIER_ADJUSTMENT", "false"),
            ("PORT", "9000"),
        ])
        .unwrap();
        assert_eq!(config.llm_api_key.as_deref(), Some("gsk_test"));
        assert_eq!(config.budget.calls_per_minute, 5);
        assert_eq!(config.budget.min_delay, Duration::from_millis(500));
        assert!(!config.evaluation.reasoning_tier_adjustment);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_blank_key_treated_as_missing() {
        let config = config(&[("LLM_API_KEY", "   ")]).unwrap();
        assert_eq!(config.llm_api_key, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config(&[("PORT", "eighty")]).is_err());
        assert!(config(&[("LLM_CALLS_PER_MINUTE", "0")]).is_err());
        assert!(config(&[("LLM_MIN_CALL_DELAY_SECS", "-1")]).is_err());
        assert!(config(&[
            ("LLM_RETRY_JITTER_MIN_SECS", "9"),
            ("LLM_RETRY_JITTER_MAX_SECS", "3"),
        ])
        .is_err());
    }
}
