// SPDX-License-Identifier: Apache-2.0

use crate::analyzer::Analyzer;
use crate::http::{api_error_response, body_rejection, json_response, request_id_of};
use crate::middleware::request_tracing::RequestId;
use crate::AppState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Extension;
use std::sync::atomic::Ordering;
use texto_api::{decode_analysis_request, ApiError};
use texto_engine::EngineError;

/// Runs `work` on the blocking pool once a worker permit is free. Permit wait
/// and execution share one `request_timeout` deadline.
pub(crate) async fn run_analysis<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn Analyzer) -> Result<T, EngineError> + Send + 'static,
{
    if !state.accepting_requests.load(Ordering::Relaxed) {
        return Err(ApiError::not_ready());
    }
    let Some(analyzer) = state.analyzer.clone() else {
        let reason = state
            .model_failure
            .clone()
            .unwrap_or_else(|| "language model is not loaded".to_string());
        return Err(ApiError::model_unavailable(reason));
    };
    let timeout_ms = state.api.request_timeout.as_millis() as u64;
    let deadline = tokio::time::Instant::now() + state.api.request_timeout;

    let permit = match tokio::time::timeout_at(
        deadline,
        state.analysis_workers.clone().acquire_owned(),
    )
    .await
    {
        Ok(Ok(permit)) => permit,
        Ok(Err(_closed)) => return Err(ApiError::not_ready()),
        Err(_) => {
            state
                .metrics
                .analysis_timeouts_total
                .fetch_add(1, Ordering::Relaxed);
            return Err(ApiError::timeout(timeout_ms));
        }
    };

    let task = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work(analyzer.as_ref())
    });
    match tokio::time::timeout_at(deadline, task).await {
        Ok(Ok(result)) => result.map_err(ApiError::from),
        Ok(Err(join)) if join.is_panic() => Err(ApiError::internal("analysis panicked")),
        Ok(Err(_)) => Err(ApiError::internal("analysis task cancelled")),
        Err(_) => {
            state
                .metrics
                .analysis_timeouts_total
                .fetch_add(1, Ordering::Relaxed);
            Err(ApiError::timeout(timeout_ms))
        }
    }
}

pub(crate) async fn analyze_handler(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = request_id_of(request_id);
    let result = async {
        let body = body.map_err(|r| body_rejection(&state, &r))?;
        let request = decode_analysis_request(&body, state.api.max_text_bytes)?;
        let response = run_analysis(&state, move |a| a.analyze(&request)).await?;
        state
            .metrics
            .record_analysis(response.tokens.len(), response.entities.len());
        Ok::<_, ApiError>(response)
    }
    .await;
    match result {
        Ok(response) => json_response(&response, &request_id),
        Err(err) => api_error_response(err, &request_id),
    }
}

pub(crate) async fn redact_handler(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let request_id = request_id_of(request_id);
    let result = async {
        let body = body.map_err(|r| body_rejection(&state, &r))?;
        let request = decode_analysis_request(&body, state.api.max_text_bytes)?;
        let report = run_analysis(&state, move |a| a.redact(&request)).await?;
        state.metrics.record_redaction(report.findings.len());
        Ok::<_, ApiError>(report)
    }
    .await;
    match result {
        Ok(report) => json_response(&report, &request_id),
        Err(err) => api_error_response(err, &request_id),
    }
}
