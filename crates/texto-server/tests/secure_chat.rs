// SPDX-License-Identifier: Apache-2.0

mod http_support;

use axum::routing::post;
use axum::{Json, Router};
use http_support::{post_json, spawn_server, state_with, state_with_chat, CountingAnalyzer};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use texto_server::{ApiConfig, ChatBackend, ChatConfig, ChatError, OpenAiChat};
use tokio::sync::Mutex;

async fn spawn_mock_completions(status: u16, seen: Arc<Mutex<Vec<Value>>>) -> String {
    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |Json(body): Json<Value>| {
            let seen = seen.clone();
            async move {
                seen.lock().await.push(body);
                let code = axum::http::StatusCode::from_u16(status)
                    .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
                (
                    code,
                    Json(json!({
                        "choices": [{"message": {"role": "assistant", "content": "Listo, <PERSON>."}}]
                    })),
                )
            }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock");
    let addr = listener.local_addr().expect("mock addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock");
    });
    format!("http://{addr}")
}

fn chat_config(base_url: String) -> ChatConfig {
    ChatConfig {
        api_key: Some("sk-test".to_string()),
        base_url,
        timeout: Duration::from_secs(5),
        ..ChatConfig::default()
    }
}

#[tokio::test]
async fn simulation_returns_sanitized_prompt_and_report() {
    let counter = Arc::new(CountingAnalyzer::new());
    let addr = spawn_server(state_with(ApiConfig::default(), counter.clone())).await;
    let (status, _, body) = post_json(
        addr,
        "/chat/secure",
        &json!({"prompt": "Mi correo es ana@ejemplo.com y mi DNI es 30.123.456"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(
        body["safety_report"]["sanitized_prompt"],
        "Mi correo es <EMAIL_CUSTOM> y mi DNI es <DNI_ARG>"
    );
    assert_eq!(
        body["safety_report"]["detected_items"],
        json!(["DNI_ARG", "EMAIL_CUSTOM"])
    );
    assert_eq!(
        body["ai_response"],
        "[SIMULACIÓN] Prompt seguro: Mi correo es <EMAIL_CUSTOM> y mi DNI es <DNI_ARG>"
    );
    assert_eq!(counter.calls(), 1);
}

#[tokio::test]
async fn empty_prompt_is_invalid_input() {
    let counter = Arc::new(CountingAnalyzer::new());
    let addr = spawn_server(state_with(ApiConfig::default(), counter.clone())).await;
    let (status, _, body) = post_json(addr, "/chat/secure", &json!({"prompt": "  "})).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["details"]["reason"], "empty_text");
    assert_eq!(counter.calls(), 0);
}

#[tokio::test]
async fn openai_backend_receives_only_sanitized_text() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = spawn_mock_completions(200, seen.clone()).await;
    let chat = OpenAiChat::new("sk-test".to_string(), &chat_config(base)).expect("client");
    let addr = spawn_server(state_with_chat(
        ApiConfig::default(),
        Arc::new(CountingAnalyzer::new()),
        Arc::new(chat),
    ))
    .await;

    let (status, _, body) = post_json(
        addr,
        "/chat/secure",
        &json!({"prompt": "Redactá una carta para Juan en Madrid", "user_id": "u-7"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["ai_response"], "Listo, <PERSON>.");

    let requests = seen.lock().await;
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(sent["model"], "gpt-3.5-turbo");
    assert_eq!(sent["user"], "u-7");
    assert_eq!(sent["messages"][0]["role"], "system");
    let user_content = sent["messages"][1]["content"].as_str().expect("user content");
    assert!(!user_content.contains("Juan"));
    assert!(user_content.contains("<PERSON>"));
}

#[tokio::test]
async fn upstream_failure_is_bad_gateway() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let base = spawn_mock_completions(500, seen).await;
    let chat = OpenAiChat::new("sk-test".to_string(), &chat_config(base)).expect("client");
    let err = chat
        .complete("hola", "guest")
        .await
        .expect_err("upstream 500");
    assert_eq!(err, ChatError::Status(500));

    let addr = spawn_server(state_with_chat(
        ApiConfig::default(),
        Arc::new(CountingAnalyzer::new()),
        Arc::new(chat),
    ))
    .await;
    let (status, _, body) = post_json(addr, "/chat/secure", &json!({"prompt": "hola"})).await;
    assert_eq!(status, 502);
    assert_eq!(body["error"]["code"], "UpstreamUnavailable");
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    let chat = OpenAiChat::new(
        "sk-test".to_string(),
        &chat_config("http://127.0.0.1:1".to_string()),
    )
    .expect("client");
    let err = chat.complete("hola", "guest").await.expect_err("no listener");
    assert!(matches!(err, ChatError::Transport(_)));
}
