// SPDX-License-Identifier: Apache-2.0

use texto_model::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineErrorCode {
    InvalidInput,
    ModelUnavailable,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    InvalidInput(ValidationError),
    ModelUnavailable(String),
    Internal(String),
}

impl EngineError {
    #[must_use]
    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::ModelUnavailable(message.into())
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    #[must_use]
    pub const fn code(&self) -> EngineErrorCode {
        match self {
            Self::InvalidInput(_) => EngineErrorCode::InvalidInput,
            Self::ModelUnavailable(_) => EngineErrorCode::ModelUnavailable,
            Self::Internal(_) => EngineErrorCode::Internal,
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(err) => write!(f, "invalid input: {err}"),
            Self::ModelUnavailable(msg) => write!(f, "model unavailable: {msg}"),
            Self::Internal(msg) => write!(f, "internal failure: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ValidationError> for EngineError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidInput(value)
    }
}
