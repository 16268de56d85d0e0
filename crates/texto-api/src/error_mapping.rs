// SPDX-License-Identifier: Apache-2.0

use crate::{ApiError, ApiErrorCode};

pub const API_ERROR_SCHEMA_REF: &str = "#/components/schemas/ApiError";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiErrorMapping {
    pub status_code: u16,
    pub schema_ref: &'static str,
    /// Seconds a client should wait before retrying, when retrying can help.
    pub retry_after_secs: Option<u64>,
}

#[must_use]
pub fn status_for(code: ApiErrorCode) -> u16 {
    match code {
        ApiErrorCode::InvalidInput => 400,
        ApiErrorCode::UpstreamUnavailable => 502,
        ApiErrorCode::ModelUnavailable | ApiErrorCode::NotReady | ApiErrorCode::Timeout => 503,
        _ => 500,
    }
}

#[must_use]
pub fn map_error(error: &ApiError) -> ApiErrorMapping {
    let status_code = status_for(error.code);
    ApiErrorMapping {
        status_code,
        schema_ref: API_ERROR_SCHEMA_REF,
        retry_after_secs: (status_code == 503).then_some(1),
    }
}
