use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::evaluation::rubric::RubricError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] RubricError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("LLM provider is not configured")]
    LlmUnavailable,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Configuration(e) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "CONFIGURATION_ERROR",
                e.to_string(),
            ),
            AppError::Llm(e) => {
                tracing::error!("LLM error: {e}");
                let (status, code) = match e {
                    LlmError::RateLimitExceeded { .. } => {
                        (StatusCode::TOO_MANY_REQUESTS, "LLM_RATE_LIMITED")
                    }
                    LlmError::Timeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "LLM_TIMEOUT"),
                    LlmError::MalformedResponse(_) => {
                        (StatusCode::BAD_GATEWAY, "LLM_MALFORMED_RESPONSE")
                    }
                    LlmError::Provider(_) => (StatusCode::BAD_GATEWAY, "LLM_ERROR"),
                };
                (status, code, e.to_string())
            }
            AppError::LlmUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "LLM_UNAVAILABLE",
                "No LLM provider key is configured".to_string(),
            ),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::Configuration(RubricError::ZeroSum),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Llm(LlmError::RateLimitExceeded { attempts: 4 }),
                StatusCode::TOO_MANY_REQUESTS,
            ),
            (
                AppError::Llm(LlmError::Timeout { attempts: 4 }),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                AppError::Llm(LlmError::MalformedResponse("eof".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (AppError::LlmUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
