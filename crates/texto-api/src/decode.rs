// SPDX-License-Identifier: Apache-2.0

use crate::ApiError;
use serde::{Deserialize, Serialize};
use texto_model::{AnalysisRequest, SecureChatRequest};

/// Wire body of `POST /v1/analyze` and `POST /v1/redact`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyzeBody {
    pub text: String,
}

/// Decodes and validates an analysis body. Runs before any engine work, so a
/// rejected body never reaches the model.
pub fn decode_analysis_request(
    body: &[u8],
    max_text_bytes: usize,
) -> Result<AnalysisRequest, ApiError> {
    let parsed: AnalyzeBody = serde_json::from_slice(body)
        .map_err(|e| ApiError::malformed_body(format!("invalid analysis body: {e}")))?;
    Ok(AnalysisRequest::parse(&parsed.text, max_text_bytes)?)
}

/// Decodes a secure chat body and validates its prompt.
pub fn decode_chat_request(
    body: &[u8],
    max_text_bytes: usize,
) -> Result<(SecureChatRequest, AnalysisRequest), ApiError> {
    let parsed: SecureChatRequest = serde_json::from_slice(body)
        .map_err(|e| ApiError::malformed_body(format!("invalid chat body: {e}")))?;
    let prompt = AnalysisRequest::parse(&parsed.prompt, max_text_bytes)?;
    Ok((parsed, prompt))
}
