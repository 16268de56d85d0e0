// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use std::env;
use std::process::ExitCode as ProcessExitCode;
use std::time::Duration;
use texto_engine::{AnalysisLimits, ModelSource};
use texto_model::ExitCode;
use texto_server::{
    body_limit_for, build_router, chat_backend_from_config, validate_startup_config_contract,
    ApiConfig, AppState, Bootstrap, ChatConfig,
};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_ms(name: &str, default: Duration) -> Duration {
    Duration::from_millis(env_u64(name, default.as_millis() as u64))
}

fn env_list(name: &str, default: Vec<String>) -> Vec<String> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect(),
        _ => default,
    }
}

fn env_secret(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn api_config_from_env() -> ApiConfig {
    let defaults = ApiConfig::default();
    let max_text_bytes = env_usize("TEXTO_MAX_TEXT_BYTES", defaults.max_text_bytes);
    ApiConfig {
        bind_addr: env::var("TEXTO_BIND").unwrap_or(defaults.bind_addr),
        max_text_bytes,
        max_body_bytes: env_usize("TEXTO_MAX_BODY_BYTES", body_limit_for(max_text_bytes)),
        request_timeout: env_duration_ms("TEXTO_REQUEST_TIMEOUT_MS", defaults.request_timeout),
        analysis_workers: env_usize("TEXTO_ANALYSIS_WORKERS", defaults.analysis_workers),
        cors_allowed_origins: env_list(
            "TEXTO_CORS_ALLOWED_ORIGINS",
            defaults.cors_allowed_origins,
        ),
        shutdown_drain: env_duration_ms("TEXTO_SHUTDOWN_DRAIN_MS", defaults.shutdown_drain),
    }
}

fn chat_config_from_env() -> ChatConfig {
    let defaults = ChatConfig::default();
    ChatConfig {
        api_key: env_secret("OPENAI_API_KEY"),
        model: env::var("TEXTO_CHAT_MODEL").unwrap_or(defaults.model),
        base_url: env::var("TEXTO_CHAT_BASE_URL").unwrap_or(defaults.base_url),
        timeout: env_duration_ms("TEXTO_CHAT_TIMEOUT_MS", defaults.timeout),
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                tokio::select! {
                    _ = sigterm.recv() => {}
                    _ = sigint.recv() => {}
                }
            }
            _ => {
                error!("signal registration failed; falling back to ctrl-c");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("TEXTO_LOG_JSON", true) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn bind(addr: &str) -> Result<TcpListener, String> {
    let addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| format!("invalid bind addr {addr}: {e}"))?;
    let socket = if addr.is_ipv4() {
        tokio::net::TcpSocket::new_v4().map_err(|e| format!("socket v4 failed: {e}"))?
    } else {
        tokio::net::TcpSocket::new_v6().map_err(|e| format!("socket v6 failed: {e}"))?
    };
    socket
        .set_reuseaddr(true)
        .map_err(|e| format!("set_reuseaddr failed: {e}"))?;
    socket.bind(addr).map_err(|e| format!("bind failed: {e}"))?;
    socket
        .listen(1024)
        .map_err(|e| format!("listen failed: {e}"))
}

fn exit_with(code: ExitCode) -> ProcessExitCode {
    ProcessExitCode::from(code.code())
}

#[tokio::main]
async fn main() -> ProcessExitCode {
    init_tracing();

    let api = api_config_from_env();
    let chat_cfg = chat_config_from_env();
    if let Err(e) = validate_startup_config_contract(&api, &chat_cfg) {
        error!(error = %e, "invalid startup configuration");
        return exit_with(ExitCode::Usage);
    }
    info!(
        bind = %api.bind_addr,
        max_text_bytes = api.max_text_bytes,
        analysis_workers = api.analysis_workers,
        chat = ?chat_cfg,
        "configuration loaded"
    );

    let mut boot = Bootstrap::new();
    let limits = AnalysisLimits {
        max_text_bytes: api.max_text_bytes,
    };
    if boot.load(&ModelSource::Builtin, limits).is_err() {
        return exit_with(ExitCode::DependencyFailure);
    }

    let chat = match chat_backend_from_config(&chat_cfg) {
        Ok(chat) => chat,
        Err(e) => {
            error!(error = %e, "chat backend setup failed");
            return exit_with(ExitCode::DependencyFailure);
        }
    };
    info!(mode = chat.mode(), "chat backend selected");

    let listener = match bind(&api.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, "listener setup failed");
            return exit_with(ExitCode::DependencyFailure);
        }
    };

    let drain = api.shutdown_drain;
    let state = AppState::from_bootstrap(api, &boot, chat);
    let app = build_router(state.clone());
    info!(addr = %state.api.bind_addr, "texto-server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            info!(drain_ms = drain.as_millis() as u64, "shutdown requested");
            state.begin_shutdown_drain();
            tokio::time::sleep(drain).await;
        })
        .await;
    match served {
        Ok(()) => {
            info!("texto-server stopped");
            exit_with(ExitCode::Success)
        }
        Err(e) => {
            error!(error = %e, "server failed");
            exit_with(ExitCode::Internal)
        }
    }
}
