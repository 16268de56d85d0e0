// SPDX-License-Identifier: Apache-2.0

use crate::config::ChatConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SIMULATION_MODE: &str = "Simulation Mode";
pub const OPENAI_MODE: &str = "OpenAI Connected";

const SYSTEM_PROMPT: &str = "Eres un asistente legal útil. El usuario te enviará textos con datos sensibles ocultos (ej: <DNI_ARG>, <MONEY_AMOUNT>). Redacta o responde manteniendo esos placeholders en su lugar para que luego puedan ser rellenados.";

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ChatError {
    Transport(String),
    Status(u16),
    MalformedReply(String),
}

impl std::fmt::Display for ChatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "chat backend unreachable: {msg}"),
            Self::Status(code) => write!(f, "chat backend returned status {code}"),
            Self::MalformedReply(msg) => write!(f, "chat backend reply malformed: {msg}"),
        }
    }
}

impl std::error::Error for ChatError {}

/// Receives prompts that have already been sanitized.
#[async_trait]
pub trait ChatBackend: Send + Sync + 'static {
    fn mode(&self) -> &'static str;
    async fn complete(&self, sanitized_prompt: &str, user_id: &str) -> Result<String, ChatError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedChat;

#[async_trait]
impl ChatBackend for SimulatedChat {
    fn mode(&self) -> &'static str {
        SIMULATION_MODE
    }

    async fn complete(&self, sanitized_prompt: &str, _user_id: &str) -> Result<String, ChatError> {
        Ok(format!("[SIMULACIÓN] Prompt seguro: {sanitized_prompt}"))
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiChat {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    user: &'a str,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct CompletionReply {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: String,
}

impl OpenAiChat {
    pub fn new(api_key: String, cfg: &ChatConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{}/v1/chat/completions", cfg.base_url.trim_end_matches('/')),
            api_key,
            model: cfg.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiChat {
    fn mode(&self) -> &'static str {
        OPENAI_MODE
    }

    async fn complete(&self, sanitized_prompt: &str, user_id: &str) -> Result<String, ChatError> {
        let body = CompletionRequest {
            model: &self.model,
            messages: [
                Message {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                Message {
                    role: "user",
                    content: sanitized_prompt,
                },
            ],
            user: user_id,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Status(status.as_u16()));
        }
        let reply: CompletionReply = response
            .json()
            .await
            .map_err(|e| ChatError::MalformedReply(e.to_string()))?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ChatError::MalformedReply("no choices".to_string()))
    }
}

/// Simulation unless an API key is configured.
pub fn chat_backend_from_config(cfg: &ChatConfig) -> Result<Arc<dyn ChatBackend>, ChatError> {
    match &cfg.api_key {
        Some(key) => Ok(Arc::new(OpenAiChat::new(key.clone(), cfg)?)),
        None => Ok(Arc::new(SimulatedChat)),
    }
}
