// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
//! HTTP service exposing the Spanish analysis engine.

use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use axum::Router;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

mod analyzer;
mod bootstrap;
mod chat;
mod config;
mod http;
mod middleware;
mod telemetry;

pub use analyzer::Analyzer;
pub use bootstrap::{Bootstrap, BootstrapPhase};
pub use chat::{
    chat_backend_from_config, ChatBackend, ChatError, OpenAiChat, SimulatedChat, OPENAI_MODE,
    SIMULATION_MODE,
};
pub use config::{
    body_limit_for, validate_startup_config_contract, ApiConfig, ChatConfig, BODY_ENVELOPE_BYTES,
    CONFIG_SCHEMA_VERSION, DEFAULT_BIND_ADDR,
};

pub const CRATE_NAME: &str = "texto-server";

#[derive(Clone)]
pub struct AppState {
    pub api: ApiConfig,
    pub(crate) analyzer: Option<Arc<dyn Analyzer>>,
    pub(crate) model_failure: Option<String>,
    pub(crate) chat: Arc<dyn ChatBackend>,
    pub(crate) ready: Arc<AtomicBool>,
    pub(crate) accepting_requests: Arc<AtomicBool>,
    pub(crate) analysis_workers: Arc<Semaphore>,
    pub(crate) metrics: Arc<telemetry::metrics::RequestMetrics>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    /// State over whatever the bootstrap produced. A failed bootstrap yields
    /// a state that is never ready.
    #[must_use]
    pub fn from_bootstrap(api: ApiConfig, boot: &Bootstrap, chat: Arc<dyn ChatBackend>) -> Self {
        let analyzer = boot.engine().map(|e| e as Arc<dyn Analyzer>);
        let failure = boot.failure().map(ToString::to_string);
        Self::build(api, analyzer, failure, chat)
    }

    #[must_use]
    pub fn with_analyzer(
        api: ApiConfig,
        analyzer: Arc<dyn Analyzer>,
        chat: Arc<dyn ChatBackend>,
    ) -> Self {
        Self::build(api, Some(analyzer), None, chat)
    }

    fn build(
        api: ApiConfig,
        analyzer: Option<Arc<dyn Analyzer>>,
        model_failure: Option<String>,
        chat: Arc<dyn ChatBackend>,
    ) -> Self {
        let ready = analyzer.is_some();
        Self {
            analysis_workers: Arc::new(Semaphore::new(api.analysis_workers.max(1))),
            api,
            analyzer,
            model_failure,
            chat,
            ready: Arc::new(AtomicBool::new(ready)),
            accepting_requests: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(telemetry::metrics::RequestMetrics::default()),
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed) && self.accepting_requests.load(Ordering::Relaxed)
    }

    /// Stops admitting analysis work. In-flight analyses finish.
    pub fn begin_shutdown_drain(&self) {
        self.accepting_requests.store(false, Ordering::Relaxed);
        self.ready.store(false, Ordering::Relaxed);
        self.analysis_workers.close();
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(http::handlers::landing_handler))
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/metrics", get(http::handlers::metrics_handler))
        .route("/v1/openapi.json", get(http::handlers::openapi_handler))
        .route("/v1/version", get(http::handlers::version_handler))
        .route("/v1/analyze", post(http::analysis::analyze_handler))
        .route("/v1/redact", post(http::analysis::redact_handler))
        .route("/chat/secure", post(http::chat::secure_chat_handler))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::cors::cors_middleware,
        ))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::request_tracing::request_tracing_middleware,
        ))
        .layer(DefaultBodyLimit::max(state.api.max_body_bytes))
        .with_state(state)
}
