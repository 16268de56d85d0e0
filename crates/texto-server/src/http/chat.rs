// SPDX-License-Identifier: Apache-2.0

use crate::http::analysis::run_analysis;
use crate::http::{api_error_response, body_rejection, json_response, request_id_of};
use crate::middleware::request_tracing::RequestId;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Extension;
use std::sync::atomic::Ordering;
use texto_api::{decode_chat_request, ApiError};
use texto_model::{SafetyReport, SecureChatResponse};

/// Redacts the prompt, then forwards only the sanitized text to the chat
/// backend. The raw prompt is never logged.
pub(crate) async fn secure_chat_handler(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = request_id_of(request_id);
    let result = async {
        let body = body.map_err(|r| body_rejection(&state, &r))?;
        let (chat_request, prompt) = decode_chat_request(&body, state.api.max_text_bytes)?;
        let report = run_analysis(&state, move |a| a.redact(&prompt)).await?;
        state.metrics.record_redaction(report.findings.len());

        let ai_response = state
            .chat
            .complete(&report.sanitized_text, &chat_request.user_id)
            .await
            .map_err(|e| {
                state
                    .metrics
                    .chat_upstream_failures_total
                    .fetch_add(1, Ordering::Relaxed);
                tracing::warn!(mode = state.chat.mode(), error = %e, "chat backend failed");
                ApiError::upstream_unavailable(e.to_string())
            })?;
        tracing::info!(
            mode = state.chat.mode(),
            detected = report.detected_items.len(),
            "secure chat answered"
        );
        Ok::<_, ApiError>(SecureChatResponse {
            ai_response,
            safety_report: SafetyReport {
                detected_items: report.detected_items,
                sanitized_prompt: report.sanitized_text,
            },
        })
    }
    .await;
    match result {
        Ok(response) => json_response(&response, &request_id),
        Err(err) => api_error_response(err, &request_id),
    }
}
