// SPDX-License-Identifier: Apache-2.0

pub(crate) mod analysis;
pub(crate) mod chat;
pub(crate) mod handlers;

use crate::middleware::request_tracing::RequestId;
use crate::AppState;
use axum::extract::rejection::BytesRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use serde::Serialize;
use serde_json::json;
use texto_api::error_mapping::map_error;
use texto_api::{ApiError, UNKNOWN_REQUEST_ID};

pub(crate) fn request_id_of(ext: Option<Extension<RequestId>>) -> String {
    ext.map_or_else(
        || UNKNOWN_REQUEST_ID.to_string(),
        |Extension(RequestId(id))| id,
    )
}

pub(crate) fn api_error_response(err: ApiError, request_id: &str) -> Response {
    let mapping = map_error(&err);
    let status =
        StatusCode::from_u16(mapping.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let err = err.with_request_id(request_id);
    if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
        tracing::error!(code = err.code.as_str(), message = %err.message, "request failed");
    } else {
        tracing::debug!(code = err.code.as_str(), message = %err.message, "request rejected");
    }
    let mut resp = (status, axum::Json(json!({ "error": err }))).into_response();
    if let Some(secs) = mapping.retry_after_secs {
        if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
            resp.headers_mut().insert(header::RETRY_AFTER, value);
        }
    }
    resp
}

/// Serializes `value` as the response body. Key order follows field order,
/// so repeated identical results are byte-identical.
pub(crate) fn json_response<T: Serialize>(value: &T, request_id: &str) -> Response {
    match serde_json::to_vec(value) {
        Ok(bytes) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
            bytes,
        )
            .into_response(),
        Err(e) => api_error_response(
            ApiError::internal(format!("response serialization failed: {e}")),
            request_id,
        ),
    }
}

pub(crate) fn body_rejection(state: &AppState, rejection: &BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::body_too_large(state.api.max_text_bytes, state.api.max_body_bytes)
    } else {
        ApiError::malformed_body(rejection.body_text())
    }
}
