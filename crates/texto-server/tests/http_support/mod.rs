// SPDX-License-Identifier: Apache-2.0
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use texto_engine::{Engine, EngineError};
use texto_model::{AnalysisRequest, AnalysisResponse, ModelInfo, RedactionReport};
use texto_server::{build_router, Analyzer, ApiConfig, AppState, ChatBackend, SimulatedChat};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Wraps the builtin engine and counts every call that reaches it.
pub struct CountingAnalyzer {
    engine: Engine,
    pub calls: AtomicUsize,
}

impl CountingAnalyzer {
    pub fn new() -> Self {
        Self {
            engine: Engine::builtin().expect("builtin engine"),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Analyzer for CountingAnalyzer {
    fn model_info(&self) -> &ModelInfo {
        self.engine.model().info()
    }

    fn model_digest(&self) -> &str {
        self.engine.model().digest()
    }

    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.engine.analyze(request)
    }

    fn redact(&self, request: &AnalysisRequest) -> Result<RedactionReport, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.engine.redact(request)
    }
}

pub enum Fault {
    Panic,
    Stall(Duration),
    Fail,
}

/// Misbehaving analyzer: panics, stalls, or reports an engine failure.
pub struct FaultyAnalyzer {
    engine: Engine,
    pub fault: Fault,
}

impl FaultyAnalyzer {
    fn with_fault(fault: Fault) -> Self {
        Self {
            engine: Engine::builtin().expect("builtin engine"),
            fault,
        }
    }

    pub fn panicking() -> Self {
        Self::with_fault(Fault::Panic)
    }

    pub fn stalling(stall: Duration) -> Self {
        Self::with_fault(Fault::Stall(stall))
    }

    pub fn failing() -> Self {
        Self::with_fault(Fault::Fail)
    }
}

impl Analyzer for FaultyAnalyzer {
    fn model_info(&self) -> &ModelInfo {
        self.engine.model().info()
    }

    fn model_digest(&self) -> &str {
        self.engine.model().digest()
    }

    fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, EngineError> {
        match self.fault {
            Fault::Stall(stall) => {
                std::thread::sleep(stall);
                self.engine.analyze(request)
            }
            Fault::Fail => Err(EngineError::internal("lexicon index corrupted")),
            Fault::Panic => panic!("analyzer blew up"),
        }
    }

    fn redact(&self, request: &AnalysisRequest) -> Result<RedactionReport, EngineError> {
        self.analyze(request)?;
        self.engine.redact(request)
    }
}

pub fn state_with(api: ApiConfig, analyzer: Arc<dyn Analyzer>) -> AppState {
    state_with_chat(api, analyzer, Arc::new(SimulatedChat))
}

pub fn state_with_chat(
    api: ApiConfig,
    analyzer: Arc<dyn Analyzer>,
    chat: Arc<dyn ChatBackend>,
) -> AppState {
    AppState::with_analyzer(api, analyzer, chat)
}

pub async fn spawn_server(state: AppState) -> std::net::SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let app = build_router(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

pub async fn send_raw(
    addr: std::net::SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    if let Some(body) = body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n\r\n{body}", body.len()));
    } else {
        req.push_str("\r\n");
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    (status, head.to_string(), body.to_string())
}

pub async fn post_json(
    addr: std::net::SocketAddr,
    path: &str,
    body: &serde_json::Value,
) -> (u16, String, serde_json::Value) {
    let (status, head, body) = send_raw(addr, "POST", path, &[], Some(&body.to_string())).await;
    let json = serde_json::from_str(&body).expect("json body");
    (status, head, json)
}

pub fn header_value<'h>(head: &'h str, name: &str) -> Option<&'h str> {
    head.lines().find_map(|line| {
        let (k, v) = line.split_once(':')?;
        k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
    })
}
