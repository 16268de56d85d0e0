// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;
use std::time::Duration;
use texto_model::DEFAULT_MAX_TEXT_BYTES;

pub const CONFIG_SCHEMA_VERSION: &str = "1";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com";
/// Room for the JSON keys and whitespace around the `text` string.
pub const BODY_ENVELOPE_BYTES: usize = 4096;

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub max_text_bytes: usize,
    pub max_body_bytes: usize,
    pub request_timeout: Duration,
    pub analysis_workers: usize,
    /// `*` admits any origin.
    pub cors_allowed_origins: Vec<String>,
    pub shutdown_drain: Duration,
}

/// Smallest body limit that never rejects a text the validator would accept.
/// A `\uXXXX` escape spends six body bytes per encoded text byte.
#[must_use]
pub const fn body_limit_for(max_text_bytes: usize) -> usize {
    max_text_bytes
        .saturating_mul(6)
        .saturating_add(BODY_ENVELOPE_BYTES)
}

#[must_use]
pub fn default_analysis_workers() -> usize {
    std::thread::available_parallelism().map_or(4, usize::from)
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            max_text_bytes: DEFAULT_MAX_TEXT_BYTES,
            max_body_bytes: body_limit_for(DEFAULT_MAX_TEXT_BYTES),
            request_timeout: Duration::from_secs(5),
            analysis_workers: default_analysis_workers(),
            cors_allowed_origins: vec!["*".to_string()],
            shutdown_drain: Duration::from_secs(2),
        }
    }
}

impl ApiConfig {
    #[must_use]
    pub fn allows_origin(&self, origin: &str) -> bool {
        self.cors_allowed_origins
            .iter()
            .any(|allowed| allowed == "*" || allowed == origin)
    }
}

#[derive(Clone, Serialize)]
pub struct ChatConfig {
    /// No key selects the simulated backend.
    #[serde(skip)]
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            base_url: DEFAULT_CHAT_BASE_URL.to_string(),
            timeout: Duration::from_secs(20),
        }
    }
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub fn validate_startup_config_contract(api: &ApiConfig, chat: &ChatConfig) -> Result<(), String> {
    if api.bind_addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(format!("invalid bind address: {}", api.bind_addr));
    }
    if api.max_text_bytes == 0 || api.max_body_bytes == 0 {
        return Err("size limits must be > 0".to_string());
    }
    if api.max_body_bytes < body_limit_for(api.max_text_bytes) {
        return Err(format!(
            "max_body_bytes must be >= {} for max_text_bytes {}",
            body_limit_for(api.max_text_bytes),
            api.max_text_bytes
        ));
    }
    if api.request_timeout.is_zero() || chat.timeout.is_zero() {
        return Err("timeouts must be > 0".to_string());
    }
    if api.analysis_workers == 0 {
        return Err("analysis_workers must be > 0".to_string());
    }
    if api.cors_allowed_origins.iter().any(|o| o.trim().is_empty()) {
        return Err("cors allowed origins must be non-empty".to_string());
    }
    if chat.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
        return Err("chat api key must be non-empty when set".to_string());
    }
    if !(chat.base_url.starts_with("http://") || chat.base_url.starts_with("https://")) {
        return Err(format!("chat base url must be http(s): {}", chat.base_url));
    }
    if chat.model.trim().is_empty() {
        return Err("chat model must be non-empty".to_string());
    }
    Ok(())
}
