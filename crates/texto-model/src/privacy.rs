// SPDX-License-Identifier: Apache-2.0

use crate::text::CharSpan;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHAT_USER_ID: &str = "guest";

/// One piece of personal data located in a text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PiiFinding {
    pub entity_type: String,
    pub text_span: String,
    pub character_offset: CharSpan,
    pub score: f32,
    pub recognizer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RedactionReport {
    pub sanitized_text: String,
    /// Distinct entity types, sorted.
    pub detected_items: Vec<String>,
    /// Findings that were replaced, ordered by start offset.
    pub findings: Vec<PiiFinding>,
}

fn default_user_id() -> String {
    DEFAULT_CHAT_USER_ID.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecureChatRequest {
    pub prompt: String,
    #[serde(default = "default_user_id")]
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SafetyReport {
    pub detected_items: Vec<String>,
    pub sanitized_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecureChatResponse {
    pub ai_response: String,
    pub safety_report: SafetyReport,
}
