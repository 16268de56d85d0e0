// SPDX-License-Identifier: Apache-2.0

mod http_support;

use http_support::{
    header_value, post_json, send_raw, spawn_server, state_with, CountingAnalyzer, FaultyAnalyzer,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use texto_engine::{Engine, EngineError};
use texto_server::{build_router, ApiConfig, AppState, Bootstrap, SimulatedChat};

fn builtin_model_name() -> String {
    Engine::builtin()
        .expect("builtin engine")
        .model()
        .info()
        .name
        .clone()
}

fn api() -> ApiConfig {
    ApiConfig {
        analysis_workers: 2,
        ..ApiConfig::default()
    }
}

#[tokio::test]
async fn analyze_returns_worked_example() {
    let addr = spawn_server(state_with(api(), Arc::new(CountingAnalyzer::new()))).await;
    let (status, head, body) =
        post_json(addr, "/v1/analyze", &json!({"text": "El gato corre rápido."})).await;
    assert_eq!(status, 200);
    assert!(header_value(&head, "content-type").is_some_and(|v| v.starts_with("application/json")));
    let lemmas: Vec<&str> = body["tokens"]
        .as_array()
        .expect("tokens")
        .iter()
        .map(|t| t["lemma"].as_str().expect("lemma"))
        .collect();
    assert_eq!(lemmas, ["el", "gato", "correr", "rápido", "."]);
    assert_eq!(body["tokens"][4]["character_offset"], json!({"start": 20, "end": 21}));
    assert_eq!(body["entities"], json!([]));
    assert_eq!(body["model"]["lang"], "es");
}

#[tokio::test]
async fn analyze_reports_entities_with_char_offsets() {
    let addr = spawn_server(state_with(api(), Arc::new(CountingAnalyzer::new()))).await;
    let (status, _, body) =
        post_json(addr, "/v1/analyze", &json!({"text": "Juan vive en Madrid."})).await;
    assert_eq!(status, 200);
    assert_eq!(
        body["entities"],
        json!([
            {"text_span": "Juan", "label": "PER", "character_offset": {"start": 0, "end": 4}},
            {"text_span": "Madrid", "label": "LOC", "character_offset": {"start": 13, "end": 19}}
        ])
    );
}

#[tokio::test]
async fn blank_text_is_rejected_before_the_engine() {
    let counter = Arc::new(CountingAnalyzer::new());
    let addr = spawn_server(state_with(api(), counter.clone())).await;
    for text in ["", "   \n\t "] {
        let (status, _, body) = post_json(addr, "/v1/analyze", &json!({"text": text})).await;
        assert_eq!(status, 400);
        assert_eq!(body["error"]["code"], "InvalidInput");
        assert_eq!(body["error"]["details"]["reason"], "empty_text");
    }
    let (status, _, _) = post_json(addr, "/v1/redact", &json!({"text": " "})).await;
    assert_eq!(status, 400);
    assert_eq!(counter.calls(), 0);
}

#[tokio::test]
async fn malformed_bodies_are_invalid_input() {
    let counter = Arc::new(CountingAnalyzer::new());
    let addr = spawn_server(state_with(api(), counter.clone())).await;
    for body in ["not json", r#"{"texto":"hola"}"#, r#"{"text":"hola","extra":1}"#] {
        let (status, _, raw) = send_raw(addr, "POST", "/v1/analyze", &[], Some(body)).await;
        assert_eq!(status, 400, "{body}");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("error json");
        assert_eq!(parsed["error"]["details"]["reason"], "malformed_body");
    }
    assert_eq!(counter.calls(), 0);
}

#[tokio::test]
async fn oversized_text_is_rejected_without_truncation() {
    let counter = Arc::new(CountingAnalyzer::new());
    let cfg = ApiConfig {
        max_text_bytes: 16,
        ..api()
    };
    let addr = spawn_server(state_with(cfg, counter.clone())).await;
    let text = "palabra ".repeat(10);
    let (status, _, body) = post_json(addr, "/v1/analyze", &json!({"text": text})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"]["reason"], "text_too_long");
    assert_eq!(body["error"]["details"]["max"], 16);
    assert_eq!(counter.calls(), 0);
}

#[tokio::test]
async fn body_over_limit_is_text_too_long() {
    let cfg = ApiConfig {
        max_body_bytes: 64,
        max_text_bytes: 64,
        ..api()
    };
    let counter = Arc::new(CountingAnalyzer::new());
    let addr = spawn_server(state_with(cfg, counter.clone())).await;
    let body = json!({"text": "a".repeat(200)}).to_string();
    for path in ["/v1/analyze", "/v1/redact", "/chat/secure"] {
        let (status, _, raw) = send_raw(addr, "POST", path, &[], Some(&body)).await;
        assert_eq!(status, 400, "{path}");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("error json");
        assert_eq!(parsed["error"]["code"], "InvalidInput");
        assert_eq!(parsed["error"]["details"]["reason"], "text_too_long");
        assert_eq!(parsed["error"]["details"]["max"], 64);
    }
    assert_eq!(counter.calls(), 0);
}

#[tokio::test]
async fn default_limits_reject_long_text_as_text_too_long() {
    let counter = Arc::new(CountingAnalyzer::new());
    let addr = spawn_server(state_with(ApiConfig::default(), counter.clone())).await;
    let (status, _, body) =
        post_json(addr, "/v1/analyze", &json!({"text": "a".repeat(300_000)})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], "InvalidInput");
    assert_eq!(body["error"]["details"]["reason"], "text_too_long");
    assert_eq!(body["error"]["details"]["len"], 300_000);
    assert_eq!(counter.calls(), 0);
}

#[tokio::test]
async fn escaped_text_at_the_limit_is_accepted_by_default() {
    let addr = spawn_server(state_with(ApiConfig::default(), Arc::new(CountingAnalyzer::new()))).await;
    // Each escape decodes to a two byte "ñ", so the text lands exactly on the default bound.
    let body = format!("{{\"text\":\"{}\"}}", "\\u00f1".repeat(50_000));
    assert!(body.len() > 300_000);
    let (status, _, raw) = send_raw(addr, "POST", "/v1/analyze", &[], Some(&body)).await;
    assert_eq!(status, 200);
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("analysis json");
    assert_eq!(parsed["text"].as_str().map(str::len), Some(100_000));
}

#[tokio::test]
async fn repeated_requests_are_byte_identical() {
    let addr = spawn_server(state_with(api(), Arc::new(CountingAnalyzer::new()))).await;
    let body = json!({"text": "La Sra. Gómez trabaja en el Banco Nación de Buenos Aires."}).to_string();
    let (_, _, first) = send_raw(addr, "POST", "/v1/analyze", &[], Some(&body)).await;
    let (_, _, second) = send_raw(addr, "POST", "/v1/analyze", &[], Some(&body)).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn failed_bootstrap_is_never_ready() {
    let boot = Bootstrap::failed(EngineError::model_unavailable("lexicon missing"));
    let state = AppState::from_bootstrap(api(), &boot, Arc::new(SimulatedChat));
    let addr = spawn_server(state).await;

    let (status, _, body) = send_raw(addr, "GET", "/readyz", &[], None).await;
    assert_eq!(status, 503);
    assert_eq!(body, "not-ready");
    let (status, _, _) = send_raw(addr, "GET", "/healthz", &[], None).await;
    assert_eq!(status, 200);

    let (status, head, body) = post_json(addr, "/v1/analyze", &json!({"text": "hola"})).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["code"], "ModelUnavailable");
    assert!(body["error"]["message"]
        .as_str()
        .is_some_and(|m| m.contains("lexicon missing")));
    assert_eq!(header_value(&head, "retry-after"), Some("1"));
}

#[tokio::test]
async fn ready_state_reports_ready_and_version() {
    let addr = spawn_server(state_with(api(), Arc::new(CountingAnalyzer::new()))).await;
    let (status, _, body) = send_raw(addr, "GET", "/readyz", &[], None).await;
    assert_eq!((status, body.as_str()), (200, "ready"));

    let (status, head, body) = send_raw(addr, "GET", "/v1/version", &[], None).await;
    assert_eq!(status, 200);
    assert_eq!(header_value(&head, "cache-control"), Some("public, max-age=30"));
    let version: serde_json::Value = serde_json::from_str(&body).expect("version json");
    assert_eq!(version["service"]["crate"], "texto-server");
    assert_eq!(version["model"]["name"], builtin_model_name());
    assert_eq!(version["model"]["sha256"].as_str().map(str::len), Some(64));
}

#[tokio::test]
async fn landing_reports_mode_and_model() {
    let addr = spawn_server(state_with(api(), Arc::new(CountingAnalyzer::new()))).await;
    let (status, _, body) = send_raw(addr, "GET", "/", &[], None).await;
    assert_eq!(status, 200);
    let landing: serde_json::Value = serde_json::from_str(&body).expect("landing json");
    assert_eq!(landing["status"], "online");
    assert_eq!(landing["mode"], "Simulation Mode");
    assert_eq!(landing["model"], builtin_model_name());
}

#[tokio::test]
async fn request_id_is_propagated_or_generated() {
    let addr = spawn_server(state_with(api(), Arc::new(CountingAnalyzer::new()))).await;
    let (_, head, _) = send_raw(addr, "GET", "/healthz", &[("x-request-id", "req-caller")], None).await;
    assert_eq!(header_value(&head, "x-request-id"), Some("req-caller"));

    let (_, head, body) = post_json(addr, "/v1/analyze", &json!({"text": ""})).await;
    let generated = header_value(&head, "x-request-id").expect("generated id");
    assert!(generated.starts_with("req-"));
    assert_eq!(body["error"]["request_id"], generated);
}

#[tokio::test]
async fn cors_preflight_and_vary() {
    let addr = spawn_server(state_with(api(), Arc::new(CountingAnalyzer::new()))).await;
    let (status, head, _) = send_raw(
        addr,
        "OPTIONS",
        "/v1/analyze",
        &[
            ("origin", "https://app.example"),
            ("access-control-request-method", "POST"),
        ],
        None,
    )
    .await;
    assert_eq!(status, 204);
    assert_eq!(header_value(&head, "access-control-allow-origin"), Some("*"));
    assert_eq!(
        header_value(&head, "access-control-allow-methods"),
        Some("GET,POST,OPTIONS")
    );

    let (_, head, _) = send_raw(addr, "GET", "/healthz", &[("origin", "https://app.example")], None).await;
    assert_eq!(header_value(&head, "vary"), Some("Origin"));
}

#[tokio::test]
async fn cors_rejects_unlisted_origin() {
    let cfg = ApiConfig {
        cors_allowed_origins: vec!["https://app.example".to_string()],
        ..api()
    };
    let addr = spawn_server(state_with(cfg, Arc::new(CountingAnalyzer::new()))).await;
    let (status, head, _) = send_raw(
        addr,
        "OPTIONS",
        "/v1/analyze",
        &[("origin", "https://evil.example")],
        None,
    )
    .await;
    assert_eq!(status, 204);
    assert_eq!(header_value(&head, "access-control-allow-origin"), None);

    let (_, head, _) = send_raw(
        addr,
        "OPTIONS",
        "/v1/analyze",
        &[("origin", "https://app.example")],
        None,
    )
    .await;
    assert_eq!(
        header_value(&head, "access-control-allow-origin"),
        Some("https://app.example")
    );
}

#[tokio::test]
async fn analysis_panic_is_internal_for_that_request_only() {
    let addr = spawn_server(state_with(api(), Arc::new(FaultyAnalyzer::panicking()))).await;
    let (status, _, body) = post_json(addr, "/v1/analyze", &json!({"text": "hola"})).await;
    assert_eq!(status, 500);
    assert_eq!(body["error"]["code"], "Internal");
    let (status, _, _) = send_raw(addr, "GET", "/healthz", &[], None).await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn analyzer_error_is_internal_and_service_stays_up() {
    let addr = spawn_server(state_with(api(), Arc::new(FaultyAnalyzer::failing()))).await;
    for path in ["/v1/analyze", "/v1/redact"] {
        let (status, head, body) = post_json(addr, path, &json!({"text": "hola"})).await;
        assert_eq!(status, 500, "{path}");
        assert_eq!(body["error"]["code"], "Internal");
        assert!(body["error"]["message"]
            .as_str()
            .is_some_and(|m| m.contains("lexicon index corrupted")));
        assert_eq!(header_value(&head, "retry-after"), None);
    }
    let (status, _, _) = send_raw(addr, "GET", "/healthz", &[], None).await;
    assert_eq!(status, 200);
    let (status, _, body) = send_raw(addr, "GET", "/readyz", &[], None).await;
    assert_eq!((status, body.as_str()), (200, "ready"));
}

#[tokio::test]
async fn slow_analysis_times_out() {
    let cfg = ApiConfig {
        request_timeout: Duration::from_millis(50),
        ..api()
    };
    let analyzer = Arc::new(FaultyAnalyzer::stalling(Duration::from_millis(400)));
    let addr = spawn_server(state_with(cfg, analyzer)).await;
    let (status, _, body) = post_json(addr, "/v1/analyze", &json!({"text": "hola"})).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["code"], "Timeout");
    assert_eq!(body["error"]["details"]["timeout_ms"], 50);
}

#[tokio::test]
async fn draining_state_stops_accepting_analysis() {
    let state = state_with(api(), Arc::new(CountingAnalyzer::new()));
    let app = build_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    state.begin_shutdown_drain();
    let (status, _, body) = send_raw(addr, "GET", "/readyz", &[], None).await;
    assert_eq!((status, body.as_str()), (503, "not-ready"));
    let (status, _, body) = post_json(addr, "/v1/analyze", &json!({"text": "hola"})).await;
    assert_eq!(status, 503);
    assert_eq!(body["error"]["code"], "NotReady");
}

#[tokio::test]
async fn metrics_count_requests_and_analyses() {
    let addr = spawn_server(state_with(api(), Arc::new(CountingAnalyzer::new()))).await;
    let _ = post_json(addr, "/v1/analyze", &json!({"text": "Juan vive en Madrid."})).await;
    let _ = post_json(addr, "/v1/analyze", &json!({"text": ""})).await;
    let (status, head, body) = send_raw(addr, "GET", "/metrics", &[], None).await;
    assert_eq!(status, 200);
    assert!(header_value(&head, "content-type").is_some_and(|v| v.starts_with("text/plain")));
    assert!(body.contains("texto_ready 1"));
    assert!(body.contains("texto_analyses_total 1"));
    assert!(body.contains("texto_entities_total 2"));
    assert!(body.contains("texto_http_requests_total{route=\"/v1/analyze\",status=\"200\"} 1"));
    assert!(body.contains("texto_http_requests_total{route=\"/v1/analyze\",status=\"400\"} 1"));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let addr = spawn_server(state_with(api(), Arc::new(CountingAnalyzer::new()))).await;
    let (status, _, body) = send_raw(addr, "GET", "/v1/openapi.json", &[], None).await;
    assert_eq!(status, 200);
    let doc: serde_json::Value = serde_json::from_str(&body).expect("openapi json");
    assert!(doc["paths"]["/v1/analyze"]["post"].is_object());
}
