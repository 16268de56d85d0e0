// SPDX-License-Identifier: Apache-2.0

use crate::AppState;
use crate::CRATE_NAME;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

pub(crate) async fn landing_handler(State(state): State<AppState>) -> impl IntoResponse {
    let model = state.analyzer.as_ref().map(|a| a.model_info().name.clone());
    Json(json!({
        "status": "online",
        "mode": state.chat.mode(),
        "model": model,
    }))
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not-ready")
    }
}

pub(crate) async fn metrics_handler(State(state): State<AppState>) -> Response {
    let body = state.metrics.render(state.is_ready()).await;
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4"),
        )],
        body,
    )
        .into_response()
}

pub(crate) async fn openapi_handler() -> impl IntoResponse {
    Json(texto_api::openapi_v1_spec())
}

pub(crate) async fn version_handler(State(state): State<AppState>) -> Response {
    let model = state.analyzer.as_ref().map(|a| {
        let info = a.model_info();
        json!({
            "name": info.name,
            "version": info.version,
            "lang": info.lang,
            "variant": texto_engine::MODEL_VARIANT,
            "sha256": a.model_digest(),
        })
    });
    let payload = json!({
        "service": {
            "crate": CRATE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "config_schema_version": crate::config::CONFIG_SCHEMA_VERSION,
        },
        "model": model,
    });
    let mut response = Json(payload).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=30"),
    );
    response
}
