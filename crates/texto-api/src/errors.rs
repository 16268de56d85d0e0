// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use texto_engine::EngineError;
use texto_model::ValidationError;

pub const UNKNOWN_REQUEST_ID: &str = "req-unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ApiErrorCode {
    InvalidInput,
    ModelUnavailable,
    NotReady,
    Timeout,
    UpstreamUnavailable,
    Internal,
}

impl ApiErrorCode {
    pub const ALL: [Self; 6] = [
        Self::InvalidInput,
        Self::ModelUnavailable,
        Self::NotReady,
        Self::Timeout,
        Self::UpstreamUnavailable,
        Self::Internal,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "InvalidInput",
            Self::ModelUnavailable => "ModelUnavailable",
            Self::NotReady => "NotReady",
            Self::Timeout => "Timeout",
            Self::UpstreamUnavailable => "UpstreamUnavailable",
            Self::Internal => "Internal",
        }
    }
}

/// Error envelope returned as `{"error": ApiError}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
    pub request_id: String,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            request_id: UNKNOWN_REQUEST_ID.to_string(),
        }
    }

    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    #[must_use]
    pub fn invalid_input(err: &ValidationError) -> Self {
        let details = match err {
            ValidationError::TextTooLong { len, max } => {
                json!({"reason": err.reason(), "len": len, "max": max})
            }
            _ => json!({"reason": err.reason()}),
        };
        Self::new(ApiErrorCode::InvalidInput, err.to_string(), details)
    }

    #[must_use]
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::new(
            ApiErrorCode::InvalidInput,
            message,
            json!({"reason": "malformed_body"}),
        )
    }

    /// Body rejected by the transport limit before the text could be measured.
    #[must_use]
    pub fn body_too_large(max_text_bytes: usize, max_body_bytes: usize) -> Self {
        Self::new(
            ApiErrorCode::InvalidInput,
            format!("request body exceeds {max_body_bytes} bytes"),
            json!({
                "reason": "text_too_long",
                "max": max_text_bytes,
                "max_body_bytes": max_body_bytes
            }),
        )
    }

    #[must_use]
    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::ModelUnavailable, message, json!({}))
    }

    #[must_use]
    pub fn not_ready() -> Self {
        Self::new(
            ApiErrorCode::NotReady,
            "service is not accepting requests",
            json!({}),
        )
    }

    #[must_use]
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::new(
            ApiErrorCode::Timeout,
            "analysis timed out",
            json!({"timeout_ms": timeout_ms}),
        )
    }

    #[must_use]
    pub fn upstream_unavailable(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::UpstreamUnavailable, message, json!({}))
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ApiErrorCode::Internal, message, json!({}))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<ValidationError> for ApiError {
    fn from(value: ValidationError) -> Self {
        Self::invalid_input(&value)
    }
}

impl From<EngineError> for ApiError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::InvalidInput(err) => Self::invalid_input(&err),
            EngineError::ModelUnavailable(msg) => Self::model_unavailable(msg),
            other => Self::internal(other.to_string()),
        }
    }
}
